////////////////////////////////////////////////////////////////////////////////
// This file is part of "Lady Deirdre", a compiler front-end foundation       //
// technology.                                                                //
//                                                                            //
// This work is proprietary software with source-available code.              //
//                                                                            //
// To copy, use, distribute, or contribute to this work, you must agree to    //
// the terms of the General License Agreement:                                //
//                                                                            //
// https://github.com/Eliah-Lakhin/lady-deirdre/blob/master/EULA.md           //
//                                                                            //
// The agreement grants a Basic Commercial License, allowing you to use       //
// this work in non-commercial and limited commercial products with a total   //
// gross revenue cap. To remove this commercial limit for one of your         //
// products, you must acquire a Full Commercial License.                      //
//                                                                            //
// If you contribute to the source code, documentation, or related materials, //
// you must grant me an exclusive license to these contributions.             //
// Contributions are governed by the "Contributions" section of the General   //
// License Agreement.                                                         //
//                                                                            //
// Copying the work in parts is strictly forbidden, except as permitted       //
// under the General License Agreement.                                       //
//                                                                            //
// If you do not or cannot agree to the terms of this Agreement,              //
// do not use this work.                                                      //
//                                                                            //
// This work is provided "as is", without any warranties, express or implied, //
// except where such disclaimers are legally invalid.                         //
//                                                                            //
// Copyright (c) 2024 Ilya Lakhin (Илья Александрович Лахин).                 //
// All rights reserved.                                                       //
////////////////////////////////////////////////////////////////////////////////

use lazy_proxy::{Deferred, Member, ProxyRegistry, Receiver};
use lazy_proxy_tests::contracts::{FileSettings, LazySettings, Settings};

#[test]
fn test_property_descriptors() {
    let registry = ProxyRegistry::new();

    let template = registry.ensure_open_template::<dyn Settings>().unwrap();

    assert_eq!(template.template_name(), "LazySettings");
    assert_eq!(template.forwarding_count(), 6);

    let descriptor = template.descriptor();

    let names = descriptor
        .members
        .iter()
        .map(Member::name)
        .collect::<Vec<_>>();

    assert_eq!(names, ["version", "level", "display_title", "reload"]);

    let Some(Member::Property(version)) = template.member("version") else {
        panic!("Missing version property.");
    };

    assert_eq!(version.ty, "u32");
    assert!(version.getter.is_some());
    assert!(version.setter.is_none());

    let Some(Member::Property(level)) = template.member("level") else {
        panic!("Missing level property.");
    };

    assert_eq!(level.getter.unwrap().method, "level");
    assert_eq!(level.getter.unwrap().receiver, Receiver::Shared);
    assert_eq!(level.setter.unwrap().method, "set_level");
    assert_eq!(level.setter.unwrap().receiver, Receiver::Exclusive);

    let Some(Member::Property(title)) = template.member("display_title") else {
        panic!("Missing display_title property.");
    };

    assert_eq!(title.ty, "String");
    assert_eq!(title.getter.unwrap().method, "title");
    assert_eq!(title.setter.unwrap().method, "rename");

    let Some(Member::Method(reload)) = template.member("reload") else {
        panic!("Missing reload method.");
    };

    assert_eq!(reload.receiver, Receiver::Exclusive);

    assert!(template.member("title").is_none());
    assert!(template.member("set_level").is_none());

    assert!(descriptor.member("version").unwrap().is_readable());
    assert!(!descriptor.member("version").unwrap().is_writable());
    assert!(descriptor.member("level").unwrap().is_writable());
}

#[test]
fn test_property_forwarding() {
    let registry = ProxyRegistry::new();

    let mut settings = registry
        .create_proxy::<dyn Settings, FileSettings>(Deferred::new(FileSettings::default))
        .unwrap();

    assert_eq!(settings.version(), 3);
    assert_eq!(settings.level(), 1);

    settings.set_level(7);
    settings.rename(String::from("report"));
    settings.reload();

    assert_eq!(settings.level(), 7);
    assert_eq!(settings.title(), "report");
}

#[test]
fn test_setter_first_access() {
    let mut settings = LazySettings::new(Deferred::new(FileSettings::default));

    assert!(!settings.deferred().is_evaluated());

    settings.set_level(9);

    let value = settings.into_deferred().into_inner().unwrap();

    assert_eq!(value.level, 9);
    assert_eq!(value.reloads, 0);
}
