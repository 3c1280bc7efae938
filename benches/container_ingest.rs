//! Ingestion throughput under a single writer, matching the teacher's
//! `benches/micro_*.rs` layout even though raw throughput is not a spec
//! concern — the ambient stack carries a benchmark harness alongside any
//! concurrency-sensitive data structure.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use criterion::{criterion_group, criterion_main, Criterion};
use lineage::{
    Authorization, Container, CurrentRights, DataSerializer, Header, LogBridge, Merger,
    MergeCacheOptions, Message, Meta, ObjectId, PartitionKey, Permissions, Result, VersionId,
    Versioned,
};

#[derive(Clone)]
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

fn linear_chain_messages(object_id: ObjectId, len: usize) -> Vec<(Message, Meta)> {
    let mut previous = None;
    let mut out = Vec::with_capacity(len);
    for _ in 0..len {
        let version = VersionId::new_random();
        let header = Header {
            object_id,
            version,
            previous_version: previous,
            merges: HashSet::new(),
            payload_class: "demo".into(),
            inherit_write: false,
            allow_write: HashSet::new(),
        };
        let message = Message {
            header,
            payload: Some(Bytes::from_static(b"payload")),
        };
        let meta = Meta {
            partition: PartitionKey(0),
            offset: 0,
            timestamp: 0,
        };
        out.push((message, meta));
        previous = Some(version);
    }
    out
}

fn bench_linear_ingest(c: &mut Criterion) {
    c.bench_function("ingest_1000_linear_revisions", |b| {
        b.iter_batched(
            || {
                let object_id = ObjectId::new_random();
                (new_container(object_id), linear_chain_messages(object_id, 1000))
            },
            |(container, messages)| {
                for (message, meta) in messages {
                    container.add(message, meta).unwrap();
                }
            },
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_linear_ingest);
criterion_main!(benches);
