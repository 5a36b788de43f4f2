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

use proc_macro2::Span;
use syn::{parse::ParseStream, spanned::Spanned, Result};

use crate::utils::dump_kw;

#[derive(Clone, Copy, Default)]
pub enum Dump {
    #[default]
    None,
    Output(Span),
    Dry(Span),
    Decl(Span),
}

impl Dump {
    // Parses the tail of the `dump` argument: either nothing, or
    // a parenthesized dump mode.
    pub fn parse_mode(keyword: Span, input: ParseStream) -> Result<Self> {
        if !input.peek(syn::token::Paren) {
            return Ok(Self::Output(keyword));
        }

        let content;
        parenthesized!(content in input);

        if content.is_empty() {
            return Ok(Self::Output(keyword));
        }

        let lookahead = content.lookahead1();

        let result = if lookahead.peek(dump_kw::output) {
            Self::Output(content.parse::<dump_kw::output>()?.span())
        } else if lookahead.peek(dump_kw::dry) {
            Self::Dry(content.parse::<dump_kw::dry>()?.span())
        } else if lookahead.peek(dump_kw::decl) {
            Self::Decl(content.parse::<dump_kw::decl>()?.span())
        } else {
            return Err(lookahead.error());
        };

        if !content.is_empty() {
            return Err(content.error("Unexpected token after the dump mode."));
        }

        Ok(result)
    }

    #[inline(always)]
    pub fn span(self) -> Option<Span> {
        match self {
            Dump::None => None,
            Dump::Output(span) => Some(span),
            Dump::Dry(span) => Some(span),
            Dump::Decl(span) => Some(span),
        }
    }

    #[inline(always)]
    pub fn is_declarative(self) -> bool {
        match self {
            Dump::Decl(..) => true,
            _ => false,
        }
    }
}
