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

macro_rules! error {
    ($span:expr, $message:expr $(,)?) => {
        ::syn::Error::new($span, ::std::format!($message))
    };

    ($span:expr, $message:expr, $($args:expr),+ $(,)?) => {
        ::syn::Error::new($span, ::std::format!($message, $($args),+))
    };
}

macro_rules! system_panic (
    ($message:expr) => {
        ::std::panic!(
            "{}",
            $crate::utils::error_message!($message),
        )
    };

    ($message:expr, $($args:tt)*) => {
        $crate::utils::system_panic!(::std::format!($message, $($args)*))
    };
);

macro_rules! error_message (
    ($message:expr) => {
        ::std::format!(
r#" !! LAZY PROXY MACRO INTERNAL ERROR
 !!
 !! This is a bug.
 !! If you see this message, please open an Issue: https://github.com/Eliah-Lakhin/lady-deirdre/issues
 !!
 !! Message: {}
 !! File: {}
 !! Line: {}
 !! Column: {}
"#,
            $message,
            file!(),
            line!(),
            column!(),
        )
    };

    ($message:expr, $($args:tt)*) => {
        $crate::utils::error_message!(::std::format!($message, $($args)*))
    };
);

pub(crate) use error;
pub(crate) use error_message;
pub(crate) use system_panic;
