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

use std::collections::HashMap;

use proc_macro2::Ident;
use quote::ToTokens;
use syn::{
    ext::IdentExt,
    parse2,
    spanned::Spanned,
    AttrStyle,
    Error,
    File,
    FnArg,
    ItemTrait,
    Pat,
    PatIdent,
    PatType,
    Result,
    ReturnType,
    Signature,
    TraitItem,
    TraitItemFn,
    Type,
    TypeParamBound,
};

use crate::{
    proxy::{
        args::ProxyArgs,
        member::{AccessorKind, PropertyAttr, ProxyMember, ProxyMethod, ProxyProperty, ReceiverKind},
    },
    utils::{contains_ident, error, system_panic, type_string, Dump},
};

const MARKERS: [&str; 3] = ["Send", "Sync", "Unpin"];

pub struct ProxyInput {
    pub(super) item: ItemTrait,
    pub(super) ident: Ident,
    pub(super) methods: Vec<ProxyMethod>,
    pub(super) members: Vec<ProxyMember>,
    pub(super) sync: bool,
    pub(crate) dump: Dump,
}

impl ProxyInput {
    pub fn new(args: ProxyArgs, mut item: ItemTrait) -> Result<Self> {
        let sync = check_header(&item)?;

        let ident = match args.name {
            Some(name) => {
                if name == item.ident {
                    return Err(error!(
                        name.span(),
                        "Forwarding type name must differ from the trait name.",
                    ));
                }

                name
            }

            None => format_ident!("{}LazyProxy", item.ident.unraw(), span = item.ident.span()),
        };

        let mut methods = Vec::with_capacity(item.items.len());
        let mut accessors = Vec::with_capacity(item.items.len());

        for trait_item in &mut item.items {
            let function = match trait_item {
                TraitItem::Fn(function) => function,

                TraitItem::Const(item) => {
                    return Err(error!(
                        item.span(),
                        "Associated constants are not supported in the service contracts.",
                    ));
                }

                TraitItem::Type(item) => {
                    return Err(error!(
                        item.span(),
                        "Associated types are not supported in the service contracts.",
                    ));
                }

                TraitItem::Macro(item) => {
                    return Err(error!(
                        item.span(),
                        "Macro calls are not supported in the service contracts.",
                    ));
                }

                other => {
                    return Err(error!(
                        other.span(),
                        "Unsupported item in the service contract.",
                    ));
                }
            };

            let property = take_property_attr(function)?;

            methods.push(ProxyMethod::try_from(&function.sig)?);
            accessors.push(property);
        }

        let members = arrange_members(&methods, accessors)?;

        let result = Self {
            item,
            ident,
            methods,
            members,
            sync,
            dump: args.dump,
        };

        match result.dump {
            Dump::None | Dump::Dry(_) | Dump::Decl(_) => {}

            Dump::Output(span) => {
                let output = result.to_token_stream();

                let output_string = match parse2::<File>(output.clone()) {
                    Ok(file) => prettyplease::unparse(&file),
                    Err(_) => output.to_string(),
                };

                let ident = &result.item.ident;

                return Err(error!(
                    span,
                    " -- Macro Debug Dump --\n\nService contract \"{ident}\" \
                    forwarding code:\n\n{output_string}",
                ));
            }
        }

        Ok(result)
    }
}

// Removes the helper attributes from the trait, so the trait can be emitted
// as is when the macro fails.
pub fn strip_helpers(item: &mut ItemTrait) {
    for trait_item in &mut item.items {
        if let TraitItem::Fn(function) = trait_item {
            function.attrs.retain(|attr| !attr.path().is_ident("property"));
        }
    }
}

// Returns true if the trait requires Sync.
fn check_header(item: &ItemTrait) -> Result<bool> {
    let mut sync = false;

    if let Some(token) = &item.auto_token {
        return Err(error!(token.span(), "Auto traits can not be service contracts."));
    }

    if !item.generics.params.is_empty() {
        return Err(error!(
            item.generics.span(),
            "Generic service contracts are not supported.",
        ));
    }

    if let Some(clause) = &item.generics.where_clause {
        return Err(error!(
            clause.span(),
            "Where clauses are not supported in the service contracts.",
        ));
    }

    for bound in &item.supertraits {
        match bound {
            TypeParamBound::Lifetime(_) => (),

            TypeParamBound::Trait(bound) => {
                let marker = bound.path.get_ident().map_or(false, |ident| {
                    MARKERS.iter().any(|marker| ident == marker)
                });

                let last_marker = bound.path.segments.last().map_or(false, |segment| {
                    segment.arguments.is_empty()
                        && MARKERS.iter().any(|marker| segment.ident == marker)
                });

                let std_path = bound.path.leading_colon.is_some()
                    || bound.path.segments.first().map_or(false, |segment| {
                        segment.ident == "std" || segment.ident == "core"
                    });

                if bound.lifetimes.is_some()
                    || !matches!(bound.modifier, syn::TraitBoundModifier::None)
                    || !(marker || (last_marker && std_path))
                {
                    return Err(error!(
                        bound.span(),
                        "Service contract supertraits are limited to Send, Sync, \
                        Unpin, and lifetime bounds.",
                    ));
                }

                if bound.path.segments.last().map_or(false, |segment| segment.ident == "Sync") {
                    sync = true;
                }
            }

            other => {
                return Err(error!(
                    other.span(),
                    "Unsupported supertrait bound.",
                ));
            }
        }
    }

    Ok(sync)
}

fn take_property_attr(function: &mut TraitItemFn) -> Result<Option<PropertyAttr>> {
    let mut result = None;
    let mut errors = None;

    function.attrs.retain(|attr| {
        if let AttrStyle::Inner(_) = attr.style {
            return true;
        }

        if attr.path().is_ident("cfg") {
            let error = error!(
                attr.span(),
                "Conditionally compiled members are not supported in the service contracts.",
            );

            push_error(&mut errors, error);

            return true;
        }

        if !attr.path().is_ident("property") {
            return true;
        }

        if result.is_some() {
            let error = error!(attr.span(), "Duplicate Property attribute.");

            push_error(&mut errors, error);

            return false;
        }

        match PropertyAttr::try_from(attr) {
            Ok(property) => result = Some(property),

            Err(error) => push_error(&mut errors, error),
        }

        false
    });

    match errors {
        Some(error) => Err(error),
        None => Ok(result),
    }
}

#[inline]
fn push_error(errors: &mut Option<Error>, error: Error) {
    match errors {
        Some(previous) => previous.combine(error),
        None => *errors = Some(error),
    }
}

fn arrange_members(
    methods: &[ProxyMethod],
    accessors: Vec<Option<PropertyAttr>>,
) -> Result<Vec<ProxyMember>> {
    let mut members = Vec::with_capacity(methods.len());
    let mut properties = HashMap::<String, usize>::with_capacity(methods.len());
    let mut plain = HashMap::<String, usize>::with_capacity(methods.len());

    for (index, (method, accessor)) in methods.iter().zip(accessors).enumerate() {
        let Some(accessor) = accessor else {
            let _ = plain.insert(method.name(), index);
            members.push(ProxyMember::Method(index));
            continue;
        };

        let name = accessor.property_name(method)?;
        let ty = accessor.value_type(method)?;

        let member = match properties.get(&name) {
            Some(member) => *member,

            None => {
                let _ = properties.insert(name.clone(), members.len());

                members.push(ProxyMember::Property(ProxyProperty {
                    name,
                    span: accessor.span,
                    ty: ty.clone(),
                    getter: None,
                    setter: None,
                }));

                members.len() - 1
            }
        };

        let ProxyMember::Property(property) = &mut members[member] else {
            system_panic!("Property index points to a method.");
        };

        let slot = match accessor.kind {
            AccessorKind::Getter => &mut property.getter,
            AccessorKind::Setter => &mut property.setter,
        };

        if slot.is_some() {
            return Err(error!(
                accessor.span,
                "Property \"{}\" already has a {}.",
                property.name,
                match accessor.kind {
                    AccessorKind::Getter => "getter",
                    AccessorKind::Setter => "setter",
                },
            ));
        }

        *slot = Some(index);

        if type_string(&property.ty) != type_string(&ty) {
            return Err(error!(
                ty.span(),
                "Property \"{}\" accessors disagree on the value type: \"{}\" and \"{}\".",
                property.name,
                type_string(&property.ty),
                type_string(&ty),
            ));
        }
    }

    for member in &members {
        let ProxyMember::Property(property) = member else {
            continue;
        };

        if plain.contains_key(&property.name) {
            return Err(error!(
                property.span,
                "Property \"{}\" conflicts with a method of the same name.",
                property.name,
            ));
        }
    }

    Ok(members)
}

impl TryFrom<&Signature> for ProxyMethod {
    type Error = Error;

    fn try_from(sig: &Signature) -> Result<Self> {
        let ident = sig.ident.clone();
        let span = ident.span();

        if let Some(token) = &sig.constness {
            return Err(error!(token.span(), "Const methods are not supported."));
        }

        if let Some(token) = &sig.asyncness {
            return Err(error!(
                token.span(),
                "Async methods are not supported in the service contracts.",
            ));
        }

        if let Some(token) = &sig.unsafety {
            return Err(error!(
                token.span(),
                "Unsafe methods are not supported in the service contracts.",
            ));
        }

        if let Some(abi) = &sig.abi {
            return Err(error!(abi.span(), "Extern methods are not supported."));
        }

        if let Some(variadic) = &sig.variadic {
            return Err(error!(variadic.span(), "Variadic methods are not supported."));
        }

        if sig.generics.type_params().next().is_some()
            || sig.generics.const_params().next().is_some()
        {
            return Err(error!(
                sig.generics.span(),
                "Generic methods are not supported in the service contracts.\n\
                Only lifetime parameters are allowed.",
            ));
        }

        if let Some(clause) = &sig.generics.where_clause {
            return Err(error!(
                clause.span(),
                "Method where clauses are not supported in the service contracts.",
            ));
        }

        let mut inputs = sig.inputs.iter();

        let receiver = match inputs.next() {
            Some(FnArg::Receiver(receiver)) => {
                if receiver.colon_token.is_some() || receiver.reference.is_none() {
                    return Err(error!(
                        receiver.span(),
                        "Method receiver must be either \"&self\" or \"&mut self\".",
                    ));
                }

                match receiver.mutability.is_some() {
                    true => ReceiverKind::Exclusive,
                    false => ReceiverKind::Shared,
                }
            }

            _ => {
                return Err(error!(
                    span,
                    "Service contract methods must have \"&self\" or \"&mut self\" receiver.",
                ));
            }
        };

        let bound = sig
            .inputs
            .iter()
            .filter_map(|arg| match arg {
                FnArg::Typed(PatType { pat, .. }) => match pat.as_ref() {
                    Pat::Ident(PatIdent { ident, .. }) => Some(ident.to_string()),
                    _ => None,
                },
                FnArg::Receiver(_) => None,
            })
            .collect::<Vec<_>>();

        let mut result_sig = sig.clone();
        let mut args = Vec::with_capacity(sig.inputs.len());
        let mut types = Vec::with_capacity(sig.inputs.len());

        for (index, arg) in result_sig.inputs.iter_mut().enumerate().skip(1) {
            let FnArg::Typed(arg) = arg else {
                return Err(error!(arg.span(), "Unexpected receiver."));
            };

            check_type(&arg.ty)?;

            let arg_ident = match arg.pat.as_ref() {
                Pat::Ident(PatIdent {
                    by_ref: None,
                    subpat: None,
                    ident,
                    ..
                }) => ident.clone(),

                _ => {
                    let mut name = format!("__arg_{index}");

                    while bound.contains(&name) {
                        name.push('_');
                    }

                    format_ident!("{name}", span = arg.pat.span())
                }
            };

            *arg.pat = Pat::Ident(PatIdent {
                attrs: Vec::new(),
                by_ref: None,
                mutability: None,
                ident: arg_ident.clone(),
                subpat: None,
            });

            args.push(arg_ident);
            types.push(arg.ty.as_ref().clone());
        }

        let output = match &sig.output {
            ReturnType::Default => None,

            ReturnType::Type(_, ty) => {
                check_type(ty)?;

                match ty.as_ref() {
                    Type::Tuple(tuple) if tuple.elems.is_empty() => None,
                    other => Some(other.clone()),
                }
            }
        };

        Ok(Self {
            ident,
            sig: result_sig,
            receiver,
            args,
            inputs: types,
            output,
        })
    }
}

fn check_type(ty: &Type) -> Result<()> {
    if contains_ident(ty, "Self") {
        return Err(error!(
            ty.span(),
            "Service contract signatures must not refer to the Self type.",
        ));
    }

    if contains_ident(ty, "impl") {
        return Err(error!(
            ty.span(),
            "Impl Trait types are not supported in the service contracts.",
        ));
    }

    Ok(())
}
