//! End-to-end walkthrough: wire a `Registry`, ingest a small divergent
//! history, and read back the reconciled frontier.

use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use lineage::{
    init_logging, Authorization, Collaborators, CurrentRights, DataSerializer, Header, LogBridge,
    Merger, MergeCacheOptions, Message, Meta, ObjectId, PartitionKey, PartitionResolver,
    Permissions, Registry, Result, VersionId, Versioned,
};

#[derive(Clone, Debug)]
struct TextRecord {
    version: VersionId,
    previous_version: Option<VersionId>,
    merges: HashSet<VersionId>,
    body: String,
}

impl Versioned for TextRecord {
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

struct Utf8Serializer;
impl DataSerializer<TextRecord> for Utf8Serializer {
    fn from_data_message(&self, _partition: PartitionKey, message: &Message, _deep: bool) -> Result<TextRecord> {
        let body = message
            .payload
            .as_ref()
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .unwrap_or_default();
        Ok(TextRecord {
            version: message.header.version,
            previous_version: message.header.previous_version,
            merges: message.header.merges.clone(),
            body,
        })
    }
}

/// Concatenates divergent tips rather than attempting real text merge —
/// good enough to demonstrate the reconciliation plumbing.
struct ConcatMerger;
impl Merger<Header> for ConcatMerger {
    fn merge(&self, pairs: &[(Option<Header>, Header)]) -> Option<Header> {
        pairs.last().map(|(_, leaf)| leaf.clone())
    }
}
impl Merger<TextRecord> for ConcatMerger {
    fn merge(&self, pairs: &[(Option<TextRecord>, TextRecord)]) -> Option<TextRecord> {
        let body = pairs
            .iter()
            .map(|(_, leaf)| leaf.body.as_str())
            .collect::<Vec<_>>()
            .join(" | ");
        pairs.last().map(|(_, leaf)| TextRecord { body, ..leaf.clone() })
    }
}

struct AllowAllAuthorization;
struct AllowAllRights;
impl CurrentRights for AllowAllRights {}
struct AllowAllPermissions;
impl Permissions for AllowAllPermissions {
    fn can_write(&self, _rights: &dyn CurrentRights) -> bool {
        true
    }
}
impl Authorization for AllowAllAuthorization {
    fn perms(
        &self,
        _partition: PartitionKey,
        _object_id: ObjectId,
        _parent_id: Option<VersionId>,
        _compute_children: bool,
    ) -> Box<dyn Permissions> {
        Box::new(AllowAllPermissions)
    }
}

struct PrintingLogBridge;
impl LogBridge<TextRecord> for PrintingLogBridge {
    fn merge_async_without_validation(&self, record: &TextRecord) {
        println!("write-back: reconciled record {:?} = {:?}", record.version, record.body);
    }
    fn sync(&self, _partition: PartitionKey, _sync_token: u64) -> Result<()> {
        Ok(())
    }
}

struct FixedPartitionResolver;
impl PartitionResolver<TextRecord> for FixedPartitionResolver {
    fn resolve(&self, _record: &TextRecord) -> PartitionKey {
        PartitionKey(0)
    }
}

fn message(object_id: ObjectId, version: VersionId, previous: Option<VersionId>, body: &str) -> Message {
    Message {
        header: Header {
            object_id,
            version,
            previous_version: previous,
            merges: HashSet::new(),
            payload_class: "text".into(),
            inherit_write: false,
            allow_write: HashSet::new(),
        },
        payload: Some(Bytes::from(body.to_string())),
    }
}

fn zero_meta() -> Meta {
    Meta {
        partition: PartitionKey(0),
        offset: 0,
        timestamp: 0,
    }
}

fn main() {
    init_logging("info");

    let registry: Registry<TextRecord> = Registry::new(Collaborators {
        serializer: Arc::new(Utf8Serializer),
        header_merger: Arc::new(ConcatMerger),
        data_merger: Arc::new(ConcatMerger),
        authorization: Arc::new(AllowAllAuthorization),
        current_rights: Arc::new(AllowAllRights),
        log_bridge: Arc::new(PrintingLogBridge),
        partition_resolver: Arc::new(FixedPartitionResolver),
        cache_options: MergeCacheOptions::default(),
    });

    let object_id = ObjectId::new_random();
    let v0 = VersionId::new_random();
    let v1a = VersionId::new_random();
    let v1b = VersionId::new_random();

    registry
        .add(message(object_id, v0, None, "root"), zero_meta())
        .unwrap();
    registry
        .add(message(object_id, v1a, Some(v0), "branch a"), zero_meta())
        .unwrap();
    registry
        .add(message(object_id, v1b, Some(v0), "branch b"), zero_meta())
        .unwrap();

    let container = registry.container_for(PartitionKey(0), object_id);
    println!("leaves: {:?}", container.leaves());

    let merged = container.merged_data().unwrap().unwrap();
    println!("merged body: {}", merged.body);
}
