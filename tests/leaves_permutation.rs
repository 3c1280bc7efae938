//! §8 round-trip property: for a DAG in which every node's declared parent
//! is itself in the insertion set, the resulting `leaves` set is identical
//! regardless of insertion order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use bytes::Bytes;
use lineage::{
    Authorization, Container, CurrentRights, DataSerializer, Header, LogBridge, Merger,
    MergeCacheOptions, Message, Meta, ObjectId, PartitionKey, Permissions, Result, VersionId,
    Versioned,
};
use proptest::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq)]
struct Record {
    version: VersionId,
    previous_version: Option<VersionId>,
    merges: HashSet<VersionId>,
}

impl Versioned for Record {
    fn version(&self) -> VersionId {
        self.version
    }
    fn set_version(&mut self, version: VersionId) {
        self.version = version;
    }
    fn previous_version(&self) -> Option<VersionId> {
        self.previous_version
    }
    fn set_previous_version(&mut self, previous: Option<VersionId>) {
        self.previous_version = previous;
    }
    fn merges(&self) -> &HashSet<VersionId> {
        &self.merges
    }
    fn set_merges(&mut self, merges: HashSet<VersionId>) {
        self.merges = merges;
    }
}

struct EchoSerializer;
impl DataSerializer<Record> for EchoSerializer {
    fn from_data_message(&self, _partition: PartitionKey, message: &Message, _deep: bool) -> Result<Record> {
        Ok(Record {
            version: message.header.version,
            previous_version: message.header.previous_version,
            merges: message.header.merges.clone(),
        })
    }
}

struct FirstWinsMerger;
impl<T: Clone> Merger<T> for FirstWinsMerger {
    fn merge(&self, pairs: &[(Option<T>, T)]) -> Option<T> {
        pairs.first().map(|(_, leaf)| leaf.clone())
    }
}

struct NoRights;
impl CurrentRights for NoRights {}
struct DenyAllPermissions;
impl Permissions for DenyAllPermissions {
    fn can_write(&self, _rights: &dyn CurrentRights) -> bool {
        false
    }
}
struct DenyAllAuthorization;
impl Authorization for DenyAllAuthorization {
    fn perms(
        &self,
        _partition: PartitionKey,
        _object_id: ObjectId,
        _parent_id: Option<VersionId>,
        _compute_children: bool,
    ) -> Box<dyn Permissions> {
        Box::new(DenyAllPermissions)
    }
}

struct NoopLogBridge;
impl LogBridge<Record> for NoopLogBridge {
    fn merge_async_without_validation(&self, _record: &Record) {}
    fn sync(&self, _partition: PartitionKey, _sync_token: u64) -> Result<()> {
        Ok(())
    }
}

fn new_container(object_id: ObjectId) -> Container<Record> {
    Container::new(
        PartitionKey(0),
        object_id,
        Arc::new(EchoSerializer),
        Arc::new(FirstWinsMerger),
        Arc::new(FirstWinsMerger),
        Arc::new(DenyAllAuthorization),
        Arc::new(NoRights),
        Arc::new(NoopLogBridge),
        MergeCacheOptions::default(),
    )
}

fn zero_meta() -> Meta {
    Meta {
        partition: PartitionKey(0),
        offset: 0,
        timestamp: 0,
    }
}

fn message(object_id: ObjectId, version: VersionId, previous_version: Option<VersionId>) -> Message {
    Message {
        header: Header {
            object_id,
            version,
            previous_version,
            merges: HashSet::new(),
            payload_class: "demo".into(),
            inherit_write: false,
            allow_write: HashSet::new(),
        },
        payload: Some(Bytes::from_static(b"x")),
    }
}

/// A 5-node DAG: `v1<-v0`, `v2<-v1`, `v3<-v2`, `v4<-v2` — a linear spine with
/// a fork at `v2`, so every declared parent is itself in the insertion set.
fn sample_dag() -> (ObjectId, Vec<VersionId>, HashMap<usize, Option<usize>>) {
    let object_id = ObjectId::new_random();
    let versions: Vec<VersionId> = (0..5).map(|_| VersionId::new_random()).collect();
    let mut parents = HashMap::new();
    parents.insert(0, None);
    parents.insert(1, Some(0));
    parents.insert(2, Some(1));
    parents.insert(3, Some(2));
    parents.insert(4, Some(2));
    (object_id, versions, parents)
}

fn all_permutations(n: usize) -> Vec<Vec<usize>> {
    fn permute(remaining: Vec<usize>, acc: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
        if remaining.is_empty() {
            out.push(acc.clone());
            return;
        }
        for i in 0..remaining.len() {
            let mut rest = remaining.clone();
            let picked = rest.remove(i);
            acc.push(picked);
            permute(rest, acc, out);
            acc.pop();
        }
    }
    let mut out = Vec::new();
    permute((0..n).collect(), &mut Vec::new(), &mut out);
    out
}

fn leaves_for_permutation(
    object_id: ObjectId,
    versions: &[VersionId],
    parents: &HashMap<usize, Option<usize>>,
    order: &[usize],
) -> HashSet<VersionId> {
    let container = new_container(object_id);
    for &index in order {
        let previous = parents[&index].map(|parent_index| versions[parent_index]);
        container
            .add(message(object_id, versions[index], previous), zero_meta())
            .unwrap();
    }
    container.leaves().into_iter().collect()
}

proptest! {
    #[test]
    fn leaves_as_a_set_is_invariant_under_insertion_order(perm_index in 0usize..120) {
        let (object_id, versions, parents) = sample_dag();
        let permutations = all_permutations(5);
        let canonical = leaves_for_permutation(object_id, &versions, &parents, &permutations[0]);
        let under_test = leaves_for_permutation(object_id, &versions, &parents, &permutations[perm_index]);
        prop_assert_eq!(canonical, under_test);
    }
}
