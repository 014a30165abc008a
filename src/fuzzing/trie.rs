use itertools::Itertools;

use super::*;

/// First and last address of a prefix.
fn range(p: &Prefix) -> (u64, u64) {
    let start = u64::from(u32::from(p.addr()));
    (start, start + p.num_addresses() - 1)
}

/// Whether the blocks are disjoint and cover `root` completely.
fn partitions(root: &Prefix, blocks: &[Prefix]) -> bool {
    let (first, last) = range(root);
    let mut expected = first;
    for (start, end) in blocks.iter().map(range).sorted() {
        if start != expected {
            return false;
        }
        expected = end + 1;
    }
    expected == last + 1
}

qc!(aggregate_and_holes_partition_root, _aggregate_and_holes_partition_root);
fn _aggregate_and_holes_partition_root(a: Allocation) -> bool {
    let t = a.trie();
    let blocks = t.aggregate().into_iter().chain(t.holes()).collect_vec();
    partitions(t.network(), &blocks)
}

qc!(aggregate_covers_allocations, _aggregate_covers_allocations);
fn _aggregate_covers_allocations(a: Allocation) -> bool {
    let t = a.trie();
    let aggregates = t.aggregate();
    if a.0.is_empty() {
        return aggregates == vec![Allocation::root()];
    }
    // every allocation is inside exactly one aggregate, and every address of an aggregate
    // is allocated
    let covered: u64 = a.0.iter().map(Prefix::num_addresses).sum();
    let total: u64 = aggregates.iter().map(Prefix::num_addresses).sum();
    covered == total
        && a.0.iter().all(|p| {
            aggregates
                .iter()
                .filter(|agg| *agg == p || agg.is_subnet(p))
                .count()
                == 1
        })
}

qc!(aggregate_sorted, _aggregate_sorted);
fn _aggregate_sorted(a: Allocation) -> bool {
    let t = a.trie();
    t.aggregate().iter().tuple_windows().all(|(x, y)| x < y)
        && t.flatten().iter().tuple_windows().all(|(x, y)| x < y)
}

#[cfg(feature = "ipnet")]
qc!(aggregate_like_ipnet, _aggregate_like_ipnet);
#[cfg(feature = "ipnet")]
fn _aggregate_like_ipnet(a: Allocation) -> bool {
    if a.0.is_empty() {
        return true;
    }
    let nets = a.0.iter().map(ipnet::Ipv4Net::from).collect_vec();
    let want = ipnet::Ipv4Net::aggregate(&nets).into_iter().sorted().collect_vec();
    let got = a.trie().aggregate().iter().map(ipnet::Ipv4Net::from).collect_vec();
    got == want
}

qc!(aggregate_idempotent, _aggregate_idempotent);
fn _aggregate_idempotent(a: Allocation) -> bool {
    let t = a.trie();
    let aggregates = t.aggregate();
    let again = PrefixTrie::from_prefixes(Allocation::root(), aggregates.clone()).unwrap();
    again.aggregate() == aggregates && again.holes().iter().sorted().eq(t.holes().iter().sorted())
}

qc!(insertion_order_irrelevant, _insertion_order_irrelevant);
fn _insertion_order_irrelevant(a: Allocation) -> bool {
    let t = a.trie();
    let reversed =
        PrefixTrie::from_prefixes(Allocation::root(), a.0.iter().rev().cloned()).unwrap();
    format!("{t:?}") == format!("{reversed:?}") && t.to_string() == reversed.to_string()
}

qc!(sparse_table_matches_nodes, _sparse_table_matches_nodes);
fn _sparse_table_matches_nodes(a: Allocation) -> bool {
    let t = a.trie();
    let sparse = t.sparse_table();
    let mut ok = sparse.len() == t.len();
    t.traverse(|node| {
        ok &= sparse[node.idx] == node.is_sparse();
        Walk::Descend
    });
    ok
}

qc!(next_inside_holes, _next_inside_holes);
fn _next_inside_holes((a, len): (Allocation, u8)) -> bool {
    let len = 16 + len % 17;
    let t = a.trie();
    let holes = t.holes();
    let next = t.next(len).unwrap();
    next.len() == holes.iter().filter(|h| h.prefix_len() <= len).count()
        && next.iter().tuple_windows().all(|(x, y)| x < y)
        && next.iter().all(|p| {
            p.prefix_len() == len
                && holes.iter().any(|h| h == p || h.is_subnet(p))
                && !a.0.iter().any(|q| overlaps(p, q))
        })
}

qc!(allocations_are_inserted_prefixes, _allocations_are_inserted_prefixes);
fn _allocations_are_inserted_prefixes(a: Allocation) -> bool {
    let t = a.trie();
    t.allocations()
        .into_iter()
        .cloned()
        .eq(a.0.iter().sorted().cloned())
}
