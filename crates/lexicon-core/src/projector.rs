//! Pure projection from a graph to the view around one selected term.

use crate::model::{Graph, Term, View};

/// Computes the parent, siblings and children of `selected_id`.
///
/// Returns `None` when `selected_id` is not a term of `graph`. Edges whose
/// endpoints do not resolve are skipped. Siblings and children follow
/// ascending `sort_order`; ties keep the order the edges arrived in.
pub fn compute_view(graph: &Graph, selected_id: &str) -> Option<View> {
    let selected = graph.term(selected_id)?.clone();

    let parent_edge = graph.parent_edge(selected_id);
    let parent = parent_edge.and_then(|edge| graph.term(&edge.parent_id).cloned());

    let siblings = match parent_edge {
        Some(edge) => resolve_children(graph, &edge.parent_id),
        None => vec![selected.clone()],
    };

    let children = resolve_children(graph, selected_id);

    Some(View {
        selected,
        parent,
        siblings,
        children,
    })
}

fn resolve_children(graph: &Graph, parent_id: &str) -> Vec<Term> {
    graph
        .child_edges(parent_id)
        .filter_map(|edge| graph.term(&edge.child_id).cloned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Edge;

    fn taxonomy() -> Graph {
        Graph::from_parts(
            vec![
                Term::new("1", "KNOWLEDGE"),
                Term::new("2", "MATH"),
                Term::new("3", "ART"),
                Term::new("4", "ALGEBRA"),
                Term::new("5", "GEOMETRY"),
            ],
            vec![
                Edge::new("1", "2", 0),
                Edge::new("1", "3", 1),
                Edge::new("2", "5", 10),
                Edge::new("2", "4", 3),
            ],
        )
        .unwrap()
    }

    fn labels(terms: &[Term]) -> Vec<&str> {
        terms.iter().map(|t| t.label.as_str()).collect()
    }

    #[test]
    fn test_single_root_view() {
        let graph = Graph::from_parts(vec![Term::new("1", "KNOWLEDGE")], vec![]).unwrap();
        let view = compute_view(&graph, "1").unwrap();

        assert_eq!(view.selected, Term::new("1", "KNOWLEDGE"));
        assert!(view.parent.is_none());
        assert_eq!(view.siblings, vec![Term::new("1", "KNOWLEDGE")]);
        assert!(view.children.is_empty());
    }

    #[test]
    fn test_child_view() {
        let view = compute_view(&taxonomy(), "2").unwrap();

        assert_eq!(view.parent, Some(Term::new("1", "KNOWLEDGE")));
        assert_eq!(labels(&view.siblings), vec!["MATH", "ART"]);
        assert_eq!(labels(&view.children), vec!["ALGEBRA", "GEOMETRY"]);
        assert_eq!(view.selected_index(), 0);
    }

    #[test]
    fn test_root_is_its_own_sibling() {
        let view = compute_view(&taxonomy(), "1").unwrap();
        assert_eq!(view.siblings, vec![view.selected.clone()]);
        assert_eq!(labels(&view.children), vec!["MATH", "ART"]);
    }

    #[test]
    fn test_unknown_selection() {
        assert!(compute_view(&taxonomy(), "99").is_none());
    }

    #[test]
    fn test_dangling_edges_dropped() {
        let graph = Graph::from_parts(
            vec![Term::new("1", "KNOWLEDGE"), Term::new("2", "MATH")],
            vec![
                Edge::new("1", "2", 0),
                Edge::new("1", "ghost", 1),
                Edge::new("2", "phantom", 0),
            ],
        )
        .unwrap();

        let view = compute_view(&graph, "2").unwrap();
        assert_eq!(labels(&view.siblings), vec!["MATH"]);
        assert!(view.children.is_empty());
    }

    #[test]
    fn test_missing_parent_term() {
        let graph = Graph::from_parts(
            vec![Term::new("2", "MATH")],
            vec![Edge::new("gone", "2", 0)],
        )
        .unwrap();

        let view = compute_view(&graph, "2").unwrap();
        assert!(view.parent.is_none());
        assert_eq!(labels(&view.siblings), vec!["MATH"]);
    }

    #[test]
    fn test_ties_are_stable() {
        let graph = Graph::from_parts(
            vec![
                Term::new("1", "KNOWLEDGE"),
                Term::new("a", "A"),
                Term::new("b", "B"),
                Term::new("c", "C"),
            ],
            vec![
                Edge::new("1", "b", 2),
                Edge::new("1", "a", 2),
                Edge::new("1", "c", 1),
            ],
        )
        .unwrap();

        let first = compute_view(&graph, "1").unwrap();
        assert_eq!(labels(&first.children), vec!["C", "B", "A"]);
        for _ in 0..5 {
            assert_eq!(compute_view(&graph, "1").unwrap(), first);
        }
    }
}
