use std::cmp::Ordering;

use super::*;

qc!(cidr_round_trip, _cidr_round_trip);
fn _cidr_round_trip(p: AnyPrefix) -> bool {
    let p = p.0;
    Prefix::from_cidr(&p.to_string()).as_ref() == Ok(&p) && p.is_network()
}

qc!(children_are_distinct_subnets, _children_are_distinct_subnets);
fn _children_are_distinct_subnets(p: AnyPrefix) -> bool {
    let p = p.0;
    match p.children() {
        Ok((left, right)) => {
            left != right
                && p.is_subnet(&left)
                && p.is_subnet(&right)
                && left.parent().as_ref() == Some(&p)
                && right.parent().as_ref() == Some(&p)
                && left.num_addresses() * 2 == p.num_addresses()
        }
        Err(e) => p.prefix_len() == 32 && e.kind() == ErrorKind::Range,
    }
}

qc!(parent_contains_prefix, _parent_contains_prefix);
fn _parent_contains_prefix(p: AnyPrefix) -> bool {
    let p = p.0;
    match p.parent() {
        Some(parent) => parent.is_subnet(&p) && parent.prefix_len() + 1 == p.prefix_len(),
        None => p.prefix_len() == 0,
    }
}

qc!(order_is_unsigned, _order_is_unsigned);
fn _order_is_unsigned((a, b): (u32, u32)) -> bool {
    let x = BitVector::from_integer(a, 32);
    let y = BitVector::from_integer(b, 32);
    x.compare(&y) == Ok(a.cmp(&b)) && x.partial_cmp(&y) == Some(a.cmp(&b))
}

qc!(prefix_order_by_address, _prefix_order_by_address);
fn _prefix_order_by_address((a, b): (AnyPrefix, AnyPrefix)) -> bool {
    let (a, b) = (a.0, b.0);
    let want = u32::from(a.addr())
        .cmp(&u32::from(b.addr()))
        .then(a.prefix_len().cmp(&b.prefix_len()));
    a.cmp(&b) == want && (want == Ordering::Equal) == (a == b)
}

#[cfg(feature = "ipnet")]
qc!(subnet_like_ipnet, _subnet_like_ipnet);
#[cfg(feature = "ipnet")]
fn _subnet_like_ipnet((a, b): (AnyPrefix, AnyPrefix)) -> bool {
    let (a, b) = (a.0, b.0);
    let (x, y) = (ipnet::Ipv4Net::from(&a), ipnet::Ipv4Net::from(&b));
    a.is_subnet(&b) == (x.contains(&y) && x != y) && Prefix::from(x) == a
}
