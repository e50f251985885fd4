use std::io::Write;

use episim::io::contact::{load_contact_edges_csv, load_contact_graph, read_contact_edges};
use episim::ContactGraph;

#[test]
fn edges_are_symmetric() {
    let mut g = ContactGraph::with_agents(5);
    let kept = g.build_from_edges(vec![(0, 1), (1, 2), (4, 0)]);
    assert_eq!(kept, 3);
    for (a, b) in [(0, 1), (1, 2), (4, 0)] {
        assert!(g.neighbors(a).contains(&b), "{b} missing from neighbors({a})");
        assert!(g.neighbors(b).contains(&a), "{a} missing from neighbors({b})");
    }
    assert!(g.neighbors(3).is_empty());
    assert_eq!(g.edge_count(), 3);
}

#[test]
fn out_of_range_edges_are_dropped_silently() {
    let mut g = ContactGraph::with_agents(3);
    let kept = g.build_from_edges(vec![(0, 1), (1, 3), (7, 2), (2, 99)]);
    assert_eq!(kept, 1);
    assert_eq!(g.neighbors(0), &[1]);
    assert_eq!(g.neighbors(1), &[0]);
    assert!(g.neighbors(2).is_empty());
    // Unknown agents answer with an empty list rather than failing.
    assert!(g.neighbors(99).is_empty());
}

#[test]
fn duplicate_edges_are_idempotent() {
    let mut g = ContactGraph::with_agents(2);
    g.build_from_edges(vec![(0, 1), (1, 0), (0, 1)]);
    assert_eq!(g.neighbors(0), &[1]);
    assert_eq!(g.neighbors(1), &[0]);
    assert_eq!(g.edge_count(), 1);
}

#[test]
fn unregistered_agents_get_no_edges() {
    let mut g = ContactGraph::new(4);
    g.insert(0).expect("insert 0");
    g.insert(1).expect("insert 1");
    assert!(g.insert(4).is_err());
    g.build_from_edges(vec![(0, 1), (1, 2), (3, 0)]);
    assert_eq!(g.registered(), 2);
    assert_eq!(g.neighbors(0), &[1]);
    assert_eq!(g.neighbors(1), &[0]);
    assert!(g.neighbors(2).is_empty());
}

#[test]
fn edge_file_loads_and_filters_by_population() {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(f, "0,1").unwrap();
    writeln!(f, "1,2").unwrap();
    writeln!(f, "2,10").unwrap();
    let path = f.path().to_str().unwrap().to_string();

    let edges = load_contact_edges_csv(&path).expect("load edges");
    assert_eq!(edges, vec![(0, 1), (1, 2), (2, 10)]);

    let g = load_contact_graph(&path, 3).expect("load graph");
    assert_eq!(g.edge_count(), 2);
    assert_eq!(g.neighbors(1).len(), 2);
    assert_eq!(g.neighbors(2), &[1]);
}

#[test]
fn malformed_edge_line_is_fatal() {
    let data = "0,1\n1,x\n2,3\n";
    let err = read_contact_edges(data.as_bytes()).expect_err("bad line must fail");
    assert!(format!("{err:#}").contains("line 2"), "unexpected error: {err:#}");

    let short = "0,1\n4\n";
    assert!(read_contact_edges(short.as_bytes()).is_err());
}
