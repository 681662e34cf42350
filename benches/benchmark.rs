use divan::{
    black_box,
    Bencher,
};
use merkle_audit::{
    Tree,
    TreeConfig,
};

// allow: unused warning if `bench_include_allocs` feature is not enabled.
#[allow(dead_code)]
#[cfg_attr(feature = "bench_include_allocs", global_allocator)]
static ALLOC: divan::AllocProfiler = divan::AllocProfiler::system();

/// Used to specify the size of data for leaves.
#[derive(Copy, Clone)]
enum InputSizes {
    /// All leaves will have the specified number of bytes.
    Fixed(usize),
    /// Leaves will have a variety of sizes ranging from 1 byte to 1 MB.
    Mixed,
}

macro_rules! benchmark_mods {
    ($([$leaf_module:ident $leaf_count:literal])+ ===== $([$data_module:ident $input_sizes:expr])+) => {
        macro_rules! inner_mods {
            ($lf_count:literal) => {
                $(
                    mod $data_module {
                        #[divan::bench]
                        fn construct_tree(bencher: divan::Bencher) {
                            crate::construct_tree(bencher, $lf_count, $input_sizes);
                        }

                        #[divan::bench]
                        fn construct_audit_proof(bencher: divan::Bencher) {
                            crate::construct_audit_proof(bencher, $lf_count, $input_sizes);
                        }

                        #[divan::bench]
                        fn construct_consistency_proof(bencher: divan::Bencher) {
                            crate::construct_consistency_proof(bencher, $lf_count, $input_sizes);
                        }

                        #[divan::bench]
                        fn verify_leaf(bencher: divan::Bencher) {
                            crate::verify_leaf(bencher, $lf_count, $input_sizes);
                        }
                    }
                )+
            }
        }

        $(
            mod $leaf_module {
                inner_mods! { $leaf_count }
            }
        )+
    };
}

benchmark_mods! {
    [one_leaf 1]
    [five_leaves 5]
    [twenty_leaves 20]
    [one_hundred_leaves 100]
    =====
    [empty_data crate::InputSizes::Fixed(0)]
    [ten_bytes crate::InputSizes::Fixed(10)]
    [one_kb crate::InputSizes::Fixed(1_000)]
    [one_hundred_kb crate::InputSizes::Fixed(100_000)]
    [one_mb crate::InputSizes::Fixed(1_000_000)]
    [mixed_sizes crate::InputSizes::Mixed]
}

fn build_tree(leaves: &[Vec<u8>]) -> Tree {
    Tree::init_from_records(TreeConfig::default(), leaves).expect("default config is always valid")
}

/// Benchmark construction of a new `Tree`.
fn construct_tree(bencher: Bencher, leaf_count: usize, input_sizes: InputSizes) {
    bencher
        .with_inputs(|| raw_leaves(leaf_count, input_sizes))
        .bench_local_refs(|raw_leaves| black_box(build_tree(black_box(raw_leaves))));
}

/// Benchmark construction of audit proofs for every leaf in a `Tree`.
fn construct_audit_proof(bencher: Bencher, leaf_count: usize, input_sizes: InputSizes) {
    bencher
        .with_inputs(|| {
            let raw_leaves = raw_leaves(leaf_count, input_sizes);
            let tree = build_tree(&raw_leaves);
            (tree, raw_leaves)
        })
        .bench_local_refs(|(tree, raw_leaves)| {
            for leaf in raw_leaves.iter() {
                let digest = tree.hash_data(leaf);
                black_box(tree.generate_audit_proof(black_box(&digest)));
            }
        });
}

/// Benchmark construction of a consistency proof against every earlier
/// prefix length of a `Tree`.
fn construct_consistency_proof(bencher: Bencher, leaf_count: usize, input_sizes: InputSizes) {
    bencher
        .with_inputs(|| {
            let raw_leaves = raw_leaves(leaf_count, input_sizes);
            let tree = build_tree(&raw_leaves);
            let old_roots: Vec<Vec<u8>> = (1..=leaf_count)
                .map(|m| build_tree(&raw_leaves[..m]).root_hash().expect("non-empty prefix"))
                .collect();
            (tree, old_roots)
        })
        .bench_local_refs(|(tree, old_roots)| {
            for old_root in old_roots.iter() {
                black_box(tree.generate_consistency_proof(black_box(old_root)));
            }
        });
}

/// Benchmark verification of inclusion using a `Tree`.
fn verify_leaf(bencher: Bencher, leaf_count: usize, input_sizes: InputSizes) {
    bencher
        .with_inputs(|| {
            let raw_leaves = raw_leaves(leaf_count, input_sizes);
            let tree = build_tree(&raw_leaves);
            let root = tree.root_hash().expect("non-empty tree");
            let proofs: Vec<_> =
                raw_leaves.iter().map(|raw_leaf| tree.generate_audit_proof(&tree.hash_data(raw_leaf))).collect();
            (proofs, root)
        })
        .bench_local_refs(|(proofs, root)| {
            for proof in proofs.iter_mut() {
                assert!(merkle_audit::validate_proof(proof, root));
            }
        });
}

/// Returns `leaf_count` `Vec<u8>`s, each with lengths specified by `input_sizes`.
fn raw_leaves(leaf_count: usize, input_sizes: InputSizes) -> Vec<Vec<u8>> {
    const MIXED_SIZES: [usize; 7] = [1_000, 1_000_000, 10, 100_000, 1, 10_000, 100];
    match input_sizes {
        InputSizes::Fixed(size) => vec![vec![1; size]; leaf_count],
        InputSizes::Mixed => MIXED_SIZES
            .iter()
            .map(|size| vec![1; *size])
            .cycle()
            .take(leaf_count)
            .collect(),
    }
}

fn main() {
    // Handle `nextest` querying the benchmark binary for tests.  Currently `divan` is incompatible
    // with `nextest`, so just report no tests available.
    // See https://github.com/nvzqz/divan/issues/43 for further details.
    let args: Vec<_> = std::env::args().collect();
    if args.contains(&"--list".to_string())
        && args.contains(&"--format".to_string())
        && args.contains(&"terse".to_string())
    {
        return;
    }
    // Run registered benchmarks.
    divan::main();
}
