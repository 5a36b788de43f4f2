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

use proc_macro2::Ident;
use syn::{
    parse::{Parse, ParseStream},
    spanned::Spanned,
    Result,
};

use crate::utils::{attr_kw, dump_kw, error, Dump};

// Arguments of the `#[lazy_proxy(...)]` attribute.
#[derive(Default)]
pub struct ProxyArgs {
    pub(super) name: Option<Ident>,
    pub(super) dump: Dump,
}

impl Parse for ProxyArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut result = Self::default();

        while !input.is_empty() {
            let lookahead = input.lookahead1();

            if lookahead.peek(attr_kw::name) {
                let keyword = input.parse::<attr_kw::name>()?;

                if result.name.is_some() {
                    return Err(error!(keyword.span(), "Duplicate name argument."));
                }

                let _ = input.parse::<Token![=]>()?;

                result.name = Some(input.parse::<Ident>()?);
            } else if lookahead.peek(dump_kw::dump) {
                let keyword = input.parse::<dump_kw::dump>()?;

                if result.dump.span().is_some() {
                    return Err(error!(keyword.span(), "Duplicate dump argument."));
                }

                result.dump = Dump::parse_mode(keyword.span(), input)?;
            } else {
                return Err(lookahead.error());
            }

            if input.is_empty() {
                break;
            }

            let _ = input.parse::<Token![,]>()?;
        }

        Ok(result)
    }
}
