////////////////////////////////////////////////////////////////////////////////
// This file is a part of the "Lady Deirdre" Work,                            //
// a compiler front-end foundation technology.                                //
//                                                                            //
// This Work is a proprietary software with source available code.            //
//                                                                            //
// To copy, use, distribute, and contribute into this Work you must agree to  //
// the terms of the End User License Agreement:                               //
//                                                                            //
// https://github.com/Eliah-Lakhin/lady-deirdre/blob/master/EULA.md.          //
//                                                                            //
// The Agreement let you use this Work in commercial and non-commercial       //
// purposes. Commercial use of the Work is free of charge to start,           //
// but the Agreement obligates you to pay me royalties                        //
// under certain conditions.                                                  //
//                                                                            //
// If you want to contribute into the source code of this Work,               //
// the Agreement obligates you to assign me all exclusive rights to           //
// the Derivative Work or contribution made by you                            //
// (this includes GitHub forks and pull requests to my repository).           //
//                                                                            //
// The Agreement does not limit rights of the third party software developers //
// as long as the third party software uses public API of this Work only,     //
// and the third party software does not incorporate or distribute            //
// this Work directly.                                                        //
//                                                                            //
// AS FAR AS THE LAW ALLOWS, THIS SOFTWARE COMES AS IS, WITHOUT ANY WARRANTY  //
// OR CONDITION, AND I WILL NOT BE LIABLE TO ANYONE FOR ANY DAMAGES           //
// RELATED TO THIS SOFTWARE, UNDER ANY KIND OF LEGAL CLAIM.                   //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this Work.                                                      //
//                                                                            //
// Copyright (c) 2022 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use proc_macro2::{Delimiter, Spacing, TokenStream, TokenTree};
use quote::ToTokens;

// Renders a type into a compact human-readable string independently from
// the compiler's token printing: `& 'a mut Option < T >` becomes
// `&'a mut Option<T>`.
pub fn type_string(ty: &impl ToTokens) -> String {
    let mut printer = TypePrinter::default();

    printer.print(ty.to_token_stream());

    printer.result
}

pub fn contains_ident(tokens: &impl ToTokens, ident: &str) -> bool {
    fn scan(stream: TokenStream, ident: &str) -> bool {
        stream.into_iter().any(|tree| match tree {
            TokenTree::Ident(candidate) => candidate == ident,
            TokenTree::Group(group) => scan(group.stream(), ident),
            _ => false,
        })
    }

    scan(tokens.to_token_stream(), ident)
}

#[derive(Default)]
struct TypePrinter {
    result: String,
    word: bool,
    space: bool,
    arrow: bool,
}

impl TypePrinter {
    fn print(&mut self, stream: TokenStream) {
        for tree in stream {
            match tree {
                TokenTree::Ident(ident) => self.push_word(&ident.to_string()),
                TokenTree::Literal(literal) => self.push_word(&literal.to_string()),

                TokenTree::Punct(punct) => {
                    let ch = punct.as_char();

                    match ch {
                        ',' | ';' => {
                            self.push(ch);
                            self.space = true;
                        }

                        '+' | '=' => {
                            self.space = true;
                            self.push(ch);
                            self.space = true;
                        }

                        '-' if punct.spacing() == Spacing::Joint => {
                            self.space = true;
                            self.push(ch);
                            self.arrow = true;
                        }

                        '>' if self.arrow => {
                            self.push(ch);
                            self.space = true;
                            self.arrow = false;
                        }

                        _ => self.push(ch),
                    }

                    self.word = false;
                }

                TokenTree::Group(group) => {
                    let (open, close) = match group.delimiter() {
                        Delimiter::Parenthesis => (Some('('), Some(')')),
                        Delimiter::Bracket => (Some('['), Some(']')),
                        Delimiter::Brace => (Some('{'), Some('}')),
                        Delimiter::None => (None, None),
                    };

                    if let Some(open) = open {
                        self.push(open);
                        self.word = false;
                    }

                    self.print(group.stream());

                    if let Some(close) = close {
                        self.space = false;
                        self.push(close);
                        self.word = false;
                    }
                }
            }
        }
    }

    fn push_word(&mut self, word: &str) {
        if self.word {
            self.space = true;
        }

        self.flush_space();
        self.result.push_str(word);
        self.word = true;
        self.arrow = false;
    }

    fn push(&mut self, ch: char) {
        if ch != '>' {
            self.arrow = false;
        }

        self.flush_space();
        self.result.push(ch);
    }

    #[inline(always)]
    fn flush_space(&mut self) {
        if self.space && !self.result.is_empty() {
            self.result.push(' ');
        }

        self.space = false;
    }
}
