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

use lazy_proxy::{lazy_proxy, Deferred, ProxyRegistry, Receiver};
use lazy_proxy_tests::{
    contracts::{Accumulator, Blender, Calculator, CalculatorLazyProxy, Mixer},
    gen::{CallGen, CallGenConfig},
};
use rand::{rngs::StdRng, SeedableRng};

#[test]
fn test_random_forwarding() {
    const SEED: u64 = 1000;
    const ITERATIONS: u64 = 50;
    const CALLS: usize = 200;

    let registry = ProxyRegistry::new();
    let gen = CallGen::new(CallGenConfig::default());

    for iteration in 1..=ITERATIONS {
        let mut rng = StdRng::seed_from_u64(SEED + iteration);

        let calls = gen.gen_many(&mut rng, CALLS);

        let mut direct = Accumulator::default();

        let mut proxy = registry
            .create_proxy::<dyn Calculator, Accumulator>(Deferred::new(Accumulator::default))
            .unwrap();

        for (index, call) in calls.iter().enumerate() {
            let expected = call.apply(&mut direct);
            let actual = call.apply(proxy.as_mut());

            assert_eq!(
                expected, actual,
                "Iteration {iteration}, call #{index} {call:?} diverged.",
            );
        }

        assert_eq!(proxy.total(), direct.total());
    }
}

#[test]
fn test_exclusive_forwarding() {
    let registry = ProxyRegistry::new();

    let mut proxy = registry
        .create_proxy::<dyn Calculator, Accumulator>(Deferred::new(|| Accumulator {
            values: vec![7],
        }))
        .unwrap();

    proxy.push(3);
    proxy.push(5);

    assert_eq!(proxy.first(), Some(&7));
    assert_eq!(proxy.total(), 15);
    assert_eq!(proxy.describe("values"), "values: [7, 3, 5]");
    assert_eq!(proxy.reset(), 3);
    assert_eq!(proxy.total(), 0);
    assert_eq!(proxy.pair((6, 7), 1), 42);
}

#[test]
fn test_forwarding_type_api() {
    let proxy = CalculatorLazyProxy::new(Deferred::new(Accumulator::default));

    assert!(!proxy.deferred().is_evaluated());
    assert_eq!(proxy.add(2, 3), 5);
    assert!(proxy.deferred().is_evaluated());

    let deferred = proxy.into_deferred();

    assert_eq!(deferred.into_inner().unwrap(), Accumulator::default());
}

#[test]
fn test_method_descriptors() {
    let registry = ProxyRegistry::new();

    let template = registry.ensure_open_template::<dyn Calculator>().unwrap();

    assert_eq!(template.name(), "Calculator");
    assert_eq!(template.template_name(), "CalculatorLazyProxy");
    assert_eq!(template.forwarding_count(), 8);

    let descriptor = template.descriptor();

    assert_eq!(descriptor.module, "lazy_proxy_tests::contracts");
    assert_eq!(descriptor.to_string(), "lazy_proxy_tests::contracts::Calculator");

    let names = descriptor
        .methods()
        .map(|method| method.name)
        .collect::<Vec<_>>();

    assert_eq!(
        names,
        ["add", "scale", "describe", "first", "push", "total", "reset", "pair"],
    );

    let scale = template.member("scale").unwrap();

    assert!(!scale.is_readable());
    assert!(!scale.is_writable());

    let scale = descriptor.methods().find(|method| method.name == "scale").unwrap();

    assert_eq!(scale.receiver, Receiver::Shared);
    assert_eq!(scale.inputs, ["&[i64]", "i64"]);
    assert_eq!(scale.output, "Vec<i64>");

    let push = descriptor.methods().find(|method| method.name == "push").unwrap();

    assert_eq!(push.receiver, Receiver::Exclusive);
    assert_eq!(push.output, "()");

    let first = descriptor.methods().find(|method| method.name == "first").unwrap();

    assert_eq!(first.output, "Option<&'a i64>");

    let pair = descriptor.methods().find(|method| method.name == "pair").unwrap();

    assert_eq!(pair.inputs, ["(i64, i64)", "u8"]);
}

mod nested {
    use lazy_proxy::lazy_proxy;

    #[lazy_proxy]
    pub(super) trait Echo {
        fn echo(&self, text: &str) -> String;

        fn r#type(&self) -> &'static str;
    }

    pub(super) struct Loud;

    impl Echo for Loud {
        fn echo(&self, text: &str) -> String {
            text.to_uppercase()
        }

        fn r#type(&self) -> &'static str {
            "loud"
        }
    }
}

#[lazy_proxy]
unsafe trait Marked: Sync {
    fn mark(&self) -> char;
}

struct Star;

unsafe impl Marked for Star {
    fn mark(&self) -> char {
        '*'
    }
}

#[test]
fn test_forwarding_shapes() {
    let registry = ProxyRegistry::new();

    let echo = registry
        .create_proxy::<dyn nested::Echo, nested::Loud>(Deferred::new(|| nested::Loud))
        .unwrap();

    assert_eq!(echo.echo("quiet"), "QUIET");
    assert_eq!(echo.r#type(), "loud");

    let template = registry.ensure_open_template::<dyn nested::Echo>().unwrap();

    assert!(template.member("type").is_some());

    let marked = registry
        .create_proxy::<dyn Marked, Star>(Deferred::new(|| Star))
        .unwrap();

    assert_eq!(marked.mark(), '*');

    let mixer = registry
        .create_proxy::<dyn Mixer, Blender>(Deferred::new(|| Blender))
        .unwrap();

    assert_eq!(mixer.mix((1, 2), 3, 4), 10);

    let template = registry.ensure_open_template::<dyn Mixer>().unwrap();
    let mix = template.descriptor().methods().next().unwrap();

    assert_eq!(mix.inputs, ["(u8, u8)", "u8", "u8"]);
}
