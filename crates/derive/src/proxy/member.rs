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

use convert_case::{Case, Casing};
use proc_macro2::{Ident, Span};
use syn::{
    ext::IdentExt,
    parse::ParseStream,
    spanned::Spanned,
    Attribute,
    Error,
    LitStr,
    Meta,
    Result,
    Type,
};

use crate::utils::{attr_kw, error, type_string};

#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum ReceiverKind {
    Shared,
    Exclusive,
}

// A trait method that the forwarding type implements.
pub(super) struct ProxyMethod {
    pub(super) ident: Ident,
    pub(super) sig: syn::Signature,
    pub(super) receiver: ReceiverKind,
    pub(super) args: Vec<Ident>,
    pub(super) inputs: Vec<Type>,
    pub(super) output: Option<Type>,
}

impl ProxyMethod {
    #[inline(always)]
    pub(super) fn name(&self) -> String {
        self.ident.unraw().to_string()
    }

    #[inline(always)]
    pub(super) fn output_string(&self) -> String {
        match &self.output {
            Some(ty) => type_string(ty),
            None => String::from("()"),
        }
    }
}

pub(super) enum ProxyMember {
    Method(usize),
    Property(ProxyProperty),
}

pub(super) struct ProxyProperty {
    pub(super) name: String,
    pub(super) span: Span,
    pub(super) ty: Type,
    pub(super) getter: Option<usize>,
    pub(super) setter: Option<usize>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum AccessorKind {
    Getter,
    Setter,
}

// The `#[property(...)]` helper attribute.
pub(super) struct PropertyAttr {
    pub(super) span: Span,
    pub(super) kind: AccessorKind,
    pub(super) name: Option<LitStr>,
}

impl TryFrom<&Attribute> for PropertyAttr {
    type Error = Error;

    fn try_from(attr: &Attribute) -> Result<Self> {
        let span = attr.span();

        let mut result = Self {
            span,
            kind: AccessorKind::Getter,
            name: None,
        };

        if let Meta::Path(..) = &attr.meta {
            return Ok(result);
        }

        attr.parse_args_with(|input: ParseStream| {
            let mut kind = None;

            while !input.is_empty() {
                let lookahead = input.lookahead1();

                if lookahead.peek(attr_kw::get) || lookahead.peek(attr_kw::set) {
                    let (keyword, accessor) = match input.peek(attr_kw::get) {
                        true => (input.parse::<attr_kw::get>()?.span(), AccessorKind::Getter),
                        false => (input.parse::<attr_kw::set>()?.span(), AccessorKind::Setter),
                    };

                    if kind.is_some() {
                        return Err(error!(keyword, "Duplicate accessor kind."));
                    }

                    kind = Some(accessor);
                } else if lookahead.peek(attr_kw::name) {
                    let keyword = input.parse::<attr_kw::name>()?;

                    if result.name.is_some() {
                        return Err(error!(keyword.span(), "Duplicate property name."));
                    }

                    let _ = input.parse::<Token![=]>()?;

                    result.name = Some(input.parse::<LitStr>()?);
                } else {
                    return Err(lookahead.error());
                }

                if input.is_empty() {
                    break;
                }

                let _ = input.parse::<Token![,]>()?;
            }

            if let Some(kind) = kind {
                result.kind = kind;
            }

            Ok(())
        })?;

        Ok(result)
    }
}

impl PropertyAttr {
    // Resolves the property name of the accessor method.
    pub(super) fn property_name(&self, method: &ProxyMethod) -> Result<String> {
        if let Some(name) = &self.name {
            let value = name.value();

            if value.trim().is_empty() {
                return Err(error!(name.span(), "Property name must not be empty."));
            }

            return Ok(value.to_case(Case::Snake));
        }

        let method_name = method.name();

        match self.kind {
            AccessorKind::Getter => Ok(method_name),

            AccessorKind::Setter => match method_name.strip_prefix("set_") {
                Some(name) if !name.is_empty() => Ok(String::from(name)),

                _ => Err(error!(
                    method.ident.span(),
                    "Setter name must start with \"set_\" prefix.\nAlternatively, \
                    use #[property(set, name = \"<property name>\")] attribute \
                    to specify the property name explicitly.",
                )),
            },
        }
    }

    // Checks the accessor method's signature and returns the property value
    // type.
    pub(super) fn value_type(&self, method: &ProxyMethod) -> Result<Type> {
        let span = method.ident.span();

        match self.kind {
            AccessorKind::Getter => {
                if !method.inputs.is_empty() {
                    return Err(error!(
                        span,
                        "Property getter must not have parameters except the receiver.",
                    ));
                }

                match &method.output {
                    Some(ty) => Ok(ty.clone()),
                    None => Err(error!(span, "Property getter must return a value.")),
                }
            }

            AccessorKind::Setter => {
                if method.output.is_some() {
                    return Err(error!(span, "Property setter must not return a value."));
                }

                match method.inputs.as_slice() {
                    [ty] => Ok(ty.clone()),

                    _ => Err(error!(
                        span,
                        "Property setter must have exactly one parameter except \
                        the receiver.",
                    )),
                }
            }
        }
    }
}
