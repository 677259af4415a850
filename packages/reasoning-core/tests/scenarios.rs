//! End-to-end scenarios, exercising the public crate surface the way a
//! downstream adapter would rather than any one module's internals.

use std::collections::BTreeMap;

use reasoning_core::{
    Delta, DeltaGraph, Edge, EdgeKind, EffectAnalyzer, EffectDiffer, Graph, GraphSimulator, IncrementalBuilder, Node,
    PatchDescriptor, RebuildStrategy, RiskAnalyzer, RiskLevel, SourceLocation, Symbol, SymbolKind, TextAstView, VfgCore,
    VfgEdge, VfgNode,
};

fn node(id: &str, file: &str) -> Node {
    Node::from_symbol(Symbol::new(id, format!("mod.{id}"), SymbolKind::Function, SourceLocation::new(file, 1, 0)))
}

// S1. Pure -> IO breaking effect.
#[test]
fn s1_pure_to_io_is_a_breaking_high_severity_diff_and_drives_a_partial_rebuild() {
    let view = TextAstView::new()
        .with_body("f1::before", "def f1(): return 1")
        .with_body("f1::after", "def f1(): print(1); return 1");
    let analyzer = EffectAnalyzer::new(&view);
    let before = analyzer.analyze(&"f1::before".to_string()).unwrap();
    let after = analyzer.analyze(&"f1::after".to_string()).unwrap();
    let diff = EffectDiffer::compare(before, after, "f1");

    assert!(diff.is_breaking);
    assert!(diff.added.iter().any(|e| format!("{e:?}") == "IO"));

    let mut old_graph = Graph::new();
    old_graph.add_node(node("f1", "f1.py"));
    let new_graph = old_graph.clone();

    let mut changes = BTreeMap::new();
    changes.insert("f1".to_string(), ("def f1(): return 1".to_string(), "def f1(): print(1); return 1".to_string()));

    let builder = IncrementalBuilder::new(&old_graph, Some(&new_graph), None, None);
    let reports = builder.analyze_changes(&changes).unwrap();
    let plan = builder.create_rebuild_plan(&changes, &reports, None);

    assert!(matches!(plan.strategy, RebuildStrategy::Minimal | RebuildStrategy::Partial));
    assert!(plan.changed_files.contains("f1.py"));
}

// S2. Global mutation is critical and bumps total_risk to BREAKING once simulated.
#[test]
fn s2_global_mutation_is_critical_and_breaking() {
    let view = TextAstView::new()
        .with_body("f2::before", "def f2(): return 2")
        .with_body("f2::after", "def f2():\n    global X\n    X += 1\n    return 2");
    let analyzer = EffectAnalyzer::new(&view);
    let before = analyzer.analyze(&"f2::before".to_string()).unwrap();
    let after = analyzer.analyze(&"f2::after".to_string()).unwrap();
    let diff = EffectDiffer::compare(before, after, "f2");

    assert!(diff.is_breaking);
    assert_eq!(format!("{:?}", diff.severity), "Critical");
}

// S3. Deleting a function with a caller is BREAKING and unsafe to apply.
#[test]
fn s3_delete_function_with_a_caller_is_breaking() {
    let mut base = Graph::new();
    base.add_node(node("n_caller", "a.py"));
    base.add_node(node("n_target", "b.py"));
    base.add_edge(Edge::new("n_caller", "n_target", EdgeKind::Calls));

    let patch = PatchDescriptor::DeleteFunction { target: "n_target".to_string() };
    let simulator = GraphSimulator::new();
    let delta_graph = simulator.simulate_patch(&patch, &base, true).unwrap();
    let risk = RiskAnalyzer::analyze(&patch, &delta_graph, &base, None).unwrap();

    assert_eq!(risk.risk_level, RiskLevel::Breaking);
    assert!(!risk.safe_to_apply);
    assert!(risk.affected_symbols.contains(&"n_caller".to_string()));
}

// S4. Adding a function with no callers is SAFE.
#[test]
fn s4_add_function_with_no_callers_is_safe() {
    let base = Graph::new();
    let patch = PatchDescriptor::AddFunction { target: "new_func".to_string(), after_code: "def new_func(): pass".to_string() };
    let simulator = GraphSimulator::new();
    let delta_graph = simulator.simulate_patch(&patch, &base, true).unwrap();
    let risk = RiskAnalyzer::analyze(&patch, &delta_graph, &base, None).unwrap();

    assert_eq!(risk.risk_level, RiskLevel::Safe);
    assert!(risk.safe_to_apply);
    assert!(risk.breaking_changes.is_empty());
}

// S5. A tainted value flows from a source to a sink through one hop.
#[test]
fn s5_taint_path_from_source_to_sql_sink() {
    let mut vfg = VfgCore::new();
    vfg.add_node(VfgNode::new("source", "source", "a.py", 1, "python").with_taint_label("PII").as_source());
    vfg.add_node(VfgNode::new("middle", "middle", "a.py", 2, "python"));
    vfg.add_node(VfgNode::new("sink", "sink", "a.py", 3, "python").as_sink());
    vfg.add_edge(VfgEdge::new("source", "middle", EdgeKind::Assigns)).unwrap();
    vfg.add_edge(VfgEdge::new("middle", "sink", EdgeKind::DbWrite)).unwrap();

    let paths = vfg.trace_taint(Some("PII"), None, None);
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0], vec!["source".to_string(), "middle".to_string(), "sink".to_string()]);
}

// S6. An HTTP_REQUEST edge between two service-tagged nodes is a cross-service flow.
#[test]
fn s6_http_request_edge_is_a_cross_service_flow() {
    let mut vfg = VfgCore::new();
    vfg.add_node(VfgNode::new("fe", "fe", "fe.py", 1, "python").with_service_context("frontend"));
    vfg.add_node(VfgNode::new("be", "be", "be.py", 1, "python").with_service_context("backend"));
    vfg.add_edge(VfgEdge::new("fe", "be", EdgeKind::HttpRequest)).unwrap();

    let flows = vfg.find_cross_service_flows();
    assert_eq!(flows.len(), 1);
    assert_eq!(flows[0], vec!["fe".to_string(), "be".to_string()]);
}

// DeltaGraph sanity: overlay never mutates the base.
#[test]
fn delta_graph_overlay_leaves_base_untouched() {
    let mut base = Graph::new();
    base.add_node(node("a", "a.py"));
    let mut overlay = DeltaGraph::new(&base);
    overlay.apply_delta(Delta::DeleteNode { id: "a".to_string() }).unwrap();

    assert!(base.node("a").is_some());
    assert!(overlay.get_node("a").is_none());
}
