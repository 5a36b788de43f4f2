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

use rand::{
    distributions::{Distribution, WeightedIndex},
    Rng,
};

use crate::contracts::Calculator;

/// A randomly generated call of the [Calculator] contract member.
#[derive(Debug, Clone)]
pub enum Call {
    Add(i64, i64),
    Scale(Vec<i64>, i64),
    Describe(String),
    First,
    Push(i64),
    Total,
    Reset,
    Pair(i64, i64),
}

/// An observable result of the [Call].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Number(i64),
    Numbers(Vec<i64>),
    Text(String),
    Head(Option<i64>),
    Count(usize),
    Unit,
}

impl Call {
    pub fn apply(&self, target: &mut dyn Calculator) -> Outcome {
        match self {
            Self::Add(left, right) => Outcome::Number(target.add(*left, *right)),
            Self::Scale(values, factor) => Outcome::Numbers(target.scale(values, *factor)),
            Self::Describe(prefix) => Outcome::Text(target.describe(prefix)),
            Self::First => Outcome::Head(target.first().copied()),
            Self::Push(value) => {
                target.push(*value);

                Outcome::Unit
            }
            Self::Total => Outcome::Number(target.total()),
            Self::Reset => Outcome::Count(target.reset()),
            Self::Pair(left, right) => Outcome::Number(target.pair((*left, *right), 0)),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CallGenConfig {
    pub number_range: i64,
    pub max_values: usize,
    pub weights: [u8; 8],
}

impl Default for CallGenConfig {
    fn default() -> Self {
        Self {
            number_range: 1_000,
            max_values: 8,
            weights: [3, 2, 1, 1, 4, 2, 1, 1],
        }
    }
}

pub struct CallGen {
    config: CallGenConfig,
    index: WeightedIndex<u8>,
}

impl CallGen {
    pub fn new(config: CallGenConfig) -> Self {
        let index = match WeightedIndex::new(config.weights) {
            Ok(index) => index,
            Err(error) => panic!("Invalid call weights. {error}"),
        };

        Self { config, index }
    }

    pub fn gen(&self, rng: &mut impl Rng) -> Call {
        match self.index.sample(rng) {
            0 => Call::Add(self.number(rng), self.number(rng)),

            1 => {
                let count = rng.gen_range(0..=self.config.max_values);

                Call::Scale(
                    (0..count).map(|_| self.number(rng)).collect(),
                    self.number(rng),
                )
            }

            2 => Call::Describe(format!("prefix-{}", rng.gen_range(0..100u32))),
            3 => Call::First,
            4 => Call::Push(self.number(rng)),
            5 => Call::Total,
            6 => Call::Reset,
            _ => Call::Pair(self.number(rng), self.number(rng)),
        }
    }

    pub fn gen_many(&self, rng: &mut impl Rng, count: usize) -> Vec<Call> {
        (0..count).map(|_| self.gen(rng)).collect()
    }

    fn number(&self, rng: &mut impl Rng) -> i64 {
        rng.gen_range(-self.config.number_range..=self.config.number_range)
    }
}
