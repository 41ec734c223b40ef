use rand::seq::SliceRandom;
use rand::Rng;

use super::mapping_model::ObjectMapping;
use crate::catalog::ModelDescriptor;

/// Assigns one model to every node id.
///
/// The catalog is shuffled once; node `i` (in the given order) receives
/// `shuffled[i % catalog.len()]`. With more nodes than models the shuffled
/// catalog is reused lap after lap, with fewer only a prefix is used. An empty
/// catalog yields no mappings at all.
pub fn assign_objects<R>(
    node_ids: &[String],
    catalog: &[ModelDescriptor],
    rng: &mut R,
) -> Vec<ObjectMapping>
where
    R: Rng + ?Sized,
{
    if catalog.is_empty() {
        return Vec::new();
    }

    let mut shuffled: Vec<&ModelDescriptor> = catalog.iter().collect();
    shuffled.shuffle(rng);

    node_ids
        .iter()
        .enumerate()
        .map(|(index, node_id)| {
            ObjectMapping::new(node_id.clone(), shuffled[index % shuffled.len()])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn nodes(count: usize) -> Vec<String> {
        (1..=count).map(|i| format!("n{i}")).collect()
    }

    fn catalog(ids: &[&str]) -> Vec<ModelDescriptor> {
        ids.iter()
            .map(|id| {
                ModelDescriptor::new(*id, id.to_uppercase(), format!("https://assets.test/{id}.glb"))
            })
            .collect()
    }

    #[test]
    fn test_cyclic_assignment_with_more_nodes_than_models() {
        let nodes = nodes(7);
        let catalog = catalog(&["a", "b", "c"]);
        let mut rng = StdRng::seed_from_u64(42);

        let mappings = assign_objects(&nodes, &catalog, &mut rng);
        assert_eq!(mappings.len(), 7);

        // Each lap repeats the first lap's permutation.
        for (i, mapping) in mappings.iter().enumerate() {
            assert_eq!(mapping.node_id, nodes[i]);
            assert_eq!(mapping.object_id, mappings[i % 3].object_id);
        }

        let first_lap: Vec<_> = mappings[..3].iter().map(|m| m.object_id.clone()).collect();
        let mut sorted = first_lap.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["a", "b", "c"]);

        let mut usage: HashMap<&str, usize> = HashMap::new();
        for mapping in &mappings {
            *usage.entry(mapping.object_id.as_str()).or_default() += 1;
        }
        assert!(usage.values().all(|&n| n >= 2));
    }

    #[test]
    fn test_fewer_nodes_than_models_uses_distinct_models() {
        let nodes = nodes(3);
        let catalog = catalog(&["a", "b", "c", "d", "e", "f", "g"]);
        let mut rng = StdRng::seed_from_u64(7);

        let mappings = assign_objects(&nodes, &catalog, &mut rng);
        assert_eq!(mappings.len(), 3);
        let mut ids: Vec<_> = mappings.iter().map(|m| m.object_id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_empty_catalog_yields_no_mappings() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(assign_objects(&nodes(5), &[], &mut rng).is_empty());
    }

    #[test]
    fn test_no_nodes_yields_no_mappings() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(assign_objects(&[], &catalog(&["a"]), &mut rng).is_empty());
    }

    #[test]
    fn test_mapping_copies_descriptor_fields() {
        let mut rng = StdRng::seed_from_u64(3);
        let mappings = assign_objects(&nodes(1), &catalog(&["a"]), &mut rng);
        assert_eq!(
            mappings,
            vec![ObjectMapping {
                node_id: "n1".to_string(),
                object_id: "a".to_string(),
                object_name: "A".to_string(),
                object_url: "https://assets.test/a.glb".to_string(),
            }]
        );
    }
}
