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

use proc_macro2::{Ident, TokenStream};
use quote::ToTokens;
use syn::{ext::IdentExt, LitStr};

use crate::{
    proxy::{
        input::ProxyInput,
        member::{ProxyMember, ProxyMethod, ReceiverKind},
    },
    utils::{type_string, Dump, Facade},
};

impl ToTokens for ProxyInput {
    fn to_tokens(&self, tokens: &mut TokenStream) {
        self.item.to_tokens(tokens);

        if let Dump::Dry(..) = self.dump {
            return;
        }

        let contract = &self.item.ident;
        let vis = &self.item.vis;
        let ident = &self.ident;

        let span = ident.span();
        let core = span.face_core();
        let boxed = span.face_box();
        let fmt = span.face_fmt();

        let target = Ident::new("__Service", span);

        let unsafety = &self.item.unsafety;

        // A shared Deferred value is Sync only if its value is Send and Sync.
        let bounds = match self.sync {
            true => quote_spanned!(span=> + ::std::marker::Send),
            false => TokenStream::new(),
        };

        let forwarders = self
            .methods
            .iter()
            .map(|method| method.forwarder(contract, &target));

        let members = self.members.iter().map(|member| member.descriptor(self));

        let contract_name = LitStr::new(contract.unraw().to_string().as_str(), contract.span());
        let template_name = LitStr::new(ident.unraw().to_string().as_str(), span);

        let struct_doc = LitStr::new(
            &format!(
                "A forwarding type of the [{contract_name}] service contract that \
                defers the construction of the service until the first call of \
                any contract member.",
                contract_name = contract_name.value(),
            ),
            span,
        );

        quote_spanned!(span=>
            #[doc = #struct_doc]
            #vis struct #ident<#target> {
                deferred: #core::Deferred<#target>,
            }

            impl<#target> #ident<#target> {
                /// Creates a forwarding object from the `deferred` value
                /// without evaluating it.
                #[inline(always)]
                #vis fn new(deferred: #core::Deferred<#target>) -> Self {
                    Self { deferred }
                }

                /// Returns the deferred value of this forwarding object.
                #[inline(always)]
                #vis fn deferred(&self) -> &#core::Deferred<#target> {
                    &self.deferred
                }

                /// Returns the deferred value, consuming this forwarding object.
                #[inline(always)]
                #vis fn into_deferred(self) -> #core::Deferred<#target> {
                    self.deferred
                }
            }

            impl<#target> #fmt::Debug for #ident<#target> {
                fn fmt(&self, formatter: &mut #fmt::Formatter<'_>) -> #fmt::Result {
                    formatter
                        .debug_struct(#template_name)
                        .field("deferred", &self.deferred)
                        .finish()
                }
            }

            #[allow(deprecated)]
            #unsafety impl<#target: #contract #bounds> #contract for #ident<#target> {
                #(
                #forwarders
                )*
            }

            impl #core::Contract for dyn #contract {
                fn descriptor() -> &'static #core::ServiceDescriptor {
                    static DESCRIPTOR: #core::ServiceDescriptor = #core::ServiceDescriptor {
                        name: #contract_name,
                        module: ::std::module_path!(),
                        template: #template_name,
                        members: &[#( #members ),*],
                    };

                    &DESCRIPTOR
                }
            }

            impl<#target: #contract #bounds + 'static> #core::ProxyOf<#target> for dyn #contract {
                type Proxy = #ident<#target>;

                #[inline(always)]
                fn construct(deferred: #core::Deferred<#target>) -> Self::Proxy {
                    #ident::new(deferred)
                }

                #[inline(always)]
                fn upcast(proxy: Self::Proxy) -> #boxed<Self> {
                    #boxed::new(proxy)
                }
            }
        )
        .to_tokens(tokens)
    }
}

impl ProxyMethod {
    fn forwarder(&self, contract: &Ident, target: &Ident) -> TokenStream {
        let span = self.ident.span();
        let core = span.face_core();

        let sig = &self.sig;
        let ident = &self.ident;
        let args = &self.args;

        let value = match self.receiver {
            ReceiverKind::Shared => quote_spanned!(span=>
                #core::Deferred::get(&self.deferred)
            ),

            ReceiverKind::Exclusive => quote_spanned!(span=>
                #core::Deferred::get_mut(&mut self.deferred)
            ),
        };

        quote_spanned!(span=>
            #[inline]
            #sig {
                <#target as #contract>::#ident(#value, #( #args ),*)
            }
        )
    }

    fn accessor(&self) -> TokenStream {
        let span = self.ident.span();
        let core = span.face_core();

        let method = LitStr::new(self.name().as_str(), span);
        let receiver = self.receiver.descriptor();

        quote_spanned!(span=>
            ::std::option::Option::Some(#core::Accessor {
                method: #method,
                receiver: #core::Receiver::#receiver,
            })
        )
    }
}

impl ReceiverKind {
    fn descriptor(self) -> Ident {
        match self {
            Self::Shared => format_ident!("Shared"),
            Self::Exclusive => format_ident!("Exclusive"),
        }
    }
}

impl ProxyMember {
    fn descriptor(&self, input: &ProxyInput) -> TokenStream {
        match self {
            Self::Method(index) => {
                let method = &input.methods[*index];

                let span = method.ident.span();
                let core = span.face_core();

                let name = LitStr::new(method.name().as_str(), span);
                let receiver = method.receiver.descriptor();
                let output = LitStr::new(method.output_string().as_str(), span);

                let inputs = method
                    .inputs
                    .iter()
                    .map(|ty| LitStr::new(type_string(ty).as_str(), span));

                quote_spanned!(span=>
                    #core::Member::Method(#core::Method {
                        name: #name,
                        receiver: #core::Receiver::#receiver,
                        inputs: &[#( #inputs ),*],
                        output: #output,
                    })
                )
            }

            Self::Property(property) => {
                let span = property.span;
                let core = span.face_core();

                let name = LitStr::new(property.name.as_str(), span);
                let ty = LitStr::new(type_string(&property.ty).as_str(), span);

                let accessor = |index: Option<usize>| match index {
                    Some(index) => input.methods[index].accessor(),
                    None => quote_spanned!(span=> ::std::option::Option::None),
                };

                let getter = accessor(property.getter);
                let setter = accessor(property.setter);

                quote_spanned!(span=>
                    #core::Member::Property(#core::Property {
                        name: #name,
                        ty: #ty,
                        getter: #getter,
                        setter: #setter,
                    })
                )
            }
        }
    }
}
