//! Property tests for drake slot alignment.
//!
//! Whatever sequence of attach/detach/replace operations a drake sees, the
//! container and model sequences stay the same length and every model stays
//! paired with the container it was attached or replaced under. Models here
//! carry their container's raw id so pairing is checkable by content.

use dragbind_core::drake::Drake;
use dragbind_core::handle::ContainerHandle;
use dragbind_core::model::model;
use dragbind_core::options::DrakeOptions;
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Attach(u64),
    Detach(u64),
    Replace(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u64..8).prop_map(Op::Attach),
        (0u64..8).prop_map(Op::Detach),
        (0u64..8).prop_map(Op::Replace),
    ]
}

proptest! {
    #[test]
    fn slots_stay_aligned_and_paired(ops in prop::collection::vec(op_strategy(), 0..64)) {
        let drake: Drake<u64> = Drake::new(DrakeOptions::default());
        for op in ops {
            match op {
                Op::Attach(id) => {
                    drake.attach(ContainerHandle::from_raw(id), model(vec![id]));
                }
                Op::Detach(id) => {
                    drake.detach(ContainerHandle::from_raw(id));
                }
                Op::Replace(id) => {
                    drake.replace_model(ContainerHandle::from_raw(id), model(vec![id, id]));
                }
            }
            let containers = drake.containers();
            let models = drake.models();
            prop_assert_eq!(containers.len(), models.len());
            for (container, list) in containers.iter().zip(models.iter()) {
                prop_assert_eq!(list[0], container.raw());
            }
        }
    }

    #[test]
    fn detach_removes_exactly_one_slot(
        ids in prop::collection::btree_set(0u64..64, 1..10),
        pick in 0usize..10,
    ) {
        let ids: Vec<u64> = ids.into_iter().collect();
        let drake: Drake<u64> = Drake::new(DrakeOptions::default());
        for &id in &ids {
            drake.attach(ContainerHandle::from_raw(id), model(vec![id]));
        }

        let victim = ids[pick % ids.len()];
        prop_assert!(drake.detach(ContainerHandle::from_raw(victim)));

        let expected: Vec<ContainerHandle> = ids
            .iter()
            .filter(|&&id| id != victim)
            .map(|&id| ContainerHandle::from_raw(id))
            .collect();
        prop_assert_eq!(drake.containers(), expected);
        for (container, list) in drake.containers().iter().zip(drake.models().iter()) {
            prop_assert_eq!(list[0], container.raw());
        }
        prop_assert_eq!(drake.index_of(ContainerHandle::from_raw(victim)), None);
    }
}
