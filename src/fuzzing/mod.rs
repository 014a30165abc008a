//! Module for testing using fuzzing (quickcheck)

use std::fmt::Debug;

use crate::*;
use quickcheck::Arbitrary;

#[cfg(miri)]
const DEFAULT_NUM_TESTS: usize = 10;
#[cfg(not(miri))]
const DEFAULT_NUM_TESTS: usize = 1000;
const DEFAULT_GEN_SIZE: usize = 100;

/// Root network of every generated allocation.
const ROOT: &str = "10.0.0.0/16";

macro_rules! qc {
    ($name:ident, $f:ident) => {
        #[test]
        fn $name() {
            proptest_runner($f)
        }
    };
}

mod prefix;
mod trie;

fn proptest_runner<A: Arbitrary + Debug, F: Fn(A) -> bool>(f: F) {
    let num_tests: usize = std::env::var("QUICKCHECK_TESTS")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_NUM_TESTS);

    let gen_size: usize = std::env::var("QUICKCHECK_GENERATOR_SIZE")
        .ok()
        .and_then(|x| x.parse::<usize>().ok())
        .unwrap_or(DEFAULT_GEN_SIZE);

    let mut gen = quickcheck::Gen::new(gen_size);

    for _ in 0..num_tests {
        let input = A::arbitrary(&mut gen);
        let input_c = input.clone();
        let success = f(input_c);
        if !success {
            shrink_failure(f, input)
        }
    }
}

fn shrink_failure<A: Arbitrary + Debug, F: Fn(A) -> bool>(f: F, input: A) -> ! {
    for i in input.shrink() {
        let i_c = i.clone();
        let success = f(i_c);
        if !success {
            shrink_failure(f, i)
        }
    }
    // all shrunken inputs pass, so `input` is minimal
    panic!(
        "[QUICKCHECK] Test case failed!\n  Minimal input:\n    {:?}",
        input
    );
}

/// Any network prefix. Shorter prefixes are more likely than in a uniform distribution.
#[derive(Clone, Debug)]
struct AnyPrefix(Prefix);

impl Arbitrary for AnyPrefix {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        #[rustfmt::skip]
        let len: u8 = *g
            .choose(&[
                0,
                1, 2, 3, 4, 5, 6, 7, 8,
                8, 12, 16, 16, 20, 24, 24, 24,
                25, 26, 27, 28, 29, 30, 31, 32,
                32, 32,
            ])
            .unwrap();
        let addr = u32::arbitrary(g);
        AnyPrefix(Prefix::from_addr(addr.into(), len).unwrap().into_network())
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        match self.0.parent() {
            Some(parent) => quickcheck::single_shrinker(AnyPrefix(parent)),
            None => quickcheck::empty_shrinker(),
        }
    }
}

/// Pairwise disjoint network prefixes within [`ROOT`], in insertion order.
#[derive(Clone, Debug)]
struct Allocation(Vec<Prefix>);

impl Allocation {
    fn root() -> Prefix {
        ROOT.parse().unwrap()
    }

    fn trie(&self) -> PrefixTrie {
        PrefixTrie::from_prefixes(Self::root(), self.0.iter().cloned()).unwrap()
    }
}

fn overlaps(a: &Prefix, b: &Prefix) -> bool {
    a == b || a.is_subnet(b) || b.is_subnet(a)
}

impl Arbitrary for Allocation {
    fn arbitrary(g: &mut quickcheck::Gen) -> Self {
        let base = u32::from(Self::root().addr());
        let mut prefixes: Vec<Prefix> = Vec::new();
        for _ in 0..g.size() {
            #[rustfmt::skip]
            let len: u8 = *g
                .choose(&[
                    17,
                    18, 18,
                    19, 19, 19,
                    20, 20, 20, 20,
                    21, 21, 21, 21,
                    22, 22, 22, 22,
                    23, 23, 23,
                    24, 24, 24,
                    26, 28,
                ])
                .unwrap();
            let addr = base | u32::from(u16::arbitrary(g));
            let prefix = Prefix::from_addr(addr.into(), len).unwrap().into_network();
            if !prefixes.iter().any(|p| overlaps(p, &prefix)) {
                prefixes.push(prefix);
            }
        }
        Allocation(prefixes)
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        // any subset of a disjoint set is disjoint
        let prefixes = self.0.clone();
        Box::new((0..prefixes.len()).map(move |i| {
            let mut p = prefixes.clone();
            p.remove(i);
            Allocation(p)
        }))
    }
}
