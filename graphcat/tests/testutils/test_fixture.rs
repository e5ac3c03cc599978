//! Catalog fixture for GraphCat integration tests
//!
//! Each fixture owns its own store, bus and cache service, so tests never share
//! catalog state and can run in parallel.

use graphcat::cache::{CacheConfig, CatalogCache};
use graphcat::catalog::scan::LabelScanKey;
use graphcat::catalog::types::sequence_name_for;
use graphcat::catalog::{
    CatalogResult, GraphCatalog, GraphId, LabelId, LabelKind, LabelRecord, NamespaceId, RelationId,
    DEFAULT_EDGE_LABEL, DEFAULT_VERTEX_LABEL,
};
use graphcat::config::GraphCatConfig;
use graphcat::plan::{Path, PlannerInfo, RangeTableEntry, RelOptInfo, RtIndex};
use once_cell::sync::Lazy;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

pub const GRAPH_NAME: &str = "test_graph";
pub const GRAPH_ID: GraphId = GraphId(1);
pub const GRAPH_NAMESPACE: NamespaceId = NamespaceId(2200);

/// First relation id handed out to label partitions
const FIRST_RELATION: u32 = 16384;

/// Attempts to reopen a sled directory whose previous handle is still closing
const OPEN_ATTEMPTS: u32 = 50;

static LOGGER: Lazy<()> = Lazy::new(|| {
    let _ = env_logger::builder().is_test(true).try_init();
});

/// Route `log` output through the test harness
pub fn init_logger() {
    Lazy::force(&LOGGER);
}

/// Catalog with one graph and its default vertex and edge labels
pub struct CatalogFixture {
    catalog: Arc<GraphCatalog>,
    next_label: i32,
    next_relation: u32,
    temp_dir: Option<TempDir>,
}

impl CatalogFixture {
    /// In-memory catalog
    pub fn new() -> Self {
        Self::with_config(GraphCatConfig::in_memory(), None)
    }

    /// In-memory catalog with caching disabled
    pub fn uncached() -> Self {
        let mut config = GraphCatConfig::in_memory();
        config.cache = CacheConfig::bypass();
        Self::with_config(config, None)
    }

    /// Sled catalog in a fresh temporary directory
    pub fn persistent() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = GraphCatConfig::persistent(temp_dir.path().join("catalog"));
        Self::with_config(config, Some(temp_dir))
    }

    /// Close and reopen a persistent catalog on the same directory
    pub fn reopen(mut self) -> Self {
        let temp_dir = self
            .temp_dir
            .take()
            .expect("reopen requires a persistent fixture");
        self.catalog.store().flush().expect("Failed to flush store");
        drop(self);
        let config = GraphCatConfig::persistent(temp_dir.path().join("catalog"));
        Self::with_config(config, Some(temp_dir))
    }

    fn with_config(config: GraphCatConfig, temp_dir: Option<TempDir>) -> Self {
        init_logger();
        let catalog = Arc::new(open_catalog(&config).expect("Failed to open catalog"));
        let mut fixture = Self {
            catalog,
            next_label: LabelId::MIN,
            next_relation: FIRST_RELATION,
            temp_dir,
        };

        let existing = fixture
            .catalog
            .store()
            .scan_labels(&LabelScanKey::Graph(GRAPH_ID))
            .expect("Failed to scan labels");
        if existing.is_empty() {
            fixture
                .catalog
                .store()
                .insert_graph(GRAPH_NAME, GRAPH_ID, GRAPH_NAMESPACE)
                .expect("Failed to create graph");
            fixture.add_label(DEFAULT_VERTEX_LABEL, LabelKind::Vertex);
            fixture.add_label(DEFAULT_EDGE_LABEL, LabelKind::Edge);
        } else {
            for label in &existing {
                fixture.next_label = fixture.next_label.max(label.label_id.0 + 1);
                fixture.next_relation = fixture.next_relation.max(label.relation_id.0 + 1);
            }
        }
        fixture
    }

    pub fn catalog(&self) -> &Arc<GraphCatalog> {
        &self.catalog
    }

    pub fn graph(&self) -> GraphId {
        GRAPH_ID
    }

    /// A second catalog over the same store whose lookups bypass every cache
    pub fn bypass_catalog(&self) -> GraphCatalog {
        let store = Arc::clone(self.catalog.store());
        let cache = Arc::new(CatalogCache::new(Arc::clone(&store), CacheConfig::bypass()));
        GraphCatalog::new(store, cache)
    }

    pub fn vertex_label(&mut self, name: &str) -> LabelRecord {
        self.add_label(name, LabelKind::Vertex)
    }

    pub fn edge_label(&mut self, name: &str) -> LabelRecord {
        self.add_label(name, LabelKind::Edge)
    }

    pub fn label(&self, name: &str) -> LabelRecord {
        self.catalog
            .label_by_name(name, GRAPH_ID)
            .expect("Failed to look up label")
            .unwrap_or_else(|| panic!("label {} does not exist", name))
    }

    fn add_label(&mut self, name: &str, kind: LabelKind) -> LabelRecord {
        let label_id = LabelId(self.next_label);
        let relation_id = RelationId(self.next_relation);
        self.next_label += 1;
        self.next_relation += 1;
        self.catalog
            .store()
            .insert_label(
                name,
                GRAPH_ID,
                label_id,
                kind,
                relation_id,
                sequence_name_for(name).as_str(),
            )
            .expect("Failed to create label")
    }

    /// Record that `edge` connected a `start` vertex to an `end` vertex
    pub fn connect(&self, edge: &LabelRecord, start: &LabelRecord, end: &LabelRecord) {
        self.catalog
            .record_edge_schema(GRAPH_ID, edge.label_id, start.label_id, end.label_id)
            .expect("Failed to record edge schema");
    }
}

/// Open a catalog, waiting out the file lock of a sled handle still shutting down
///
/// Sled releases its directory lock from background threads after the last
/// handle is dropped, so a reopen right after a drop can see `WouldBlock`.
fn open_catalog(config: &GraphCatConfig) -> CatalogResult<GraphCatalog> {
    let mut attempt = 1;
    loop {
        match GraphCatalog::open(config) {
            Err(e) if attempt < OPEN_ATTEMPTS && is_lock_contention(&e.to_string()) => {
                log::debug!("catalog directory still locked (attempt {}): {}", attempt, e);
                thread::sleep(Duration::from_millis(10 * u64::from(attempt.min(10))));
                attempt += 1;
            }
            result => return result,
        }
    }
}

fn is_lock_contention(message: &str) -> bool {
    message.contains("WouldBlock") || message.contains("acquire lock")
}

/// Planner state for one polymorphic scan
pub struct PolymorphicScan {
    pub root: PlannerInfo,
    pub rti: RtIndex,
    pub rel: RelOptInfo,
    /// Range table index of each partition's child scan, by label
    pub children: Vec<(LabelId, RtIndex)>,
}

impl PolymorphicScan {
    /// Labels of the children the first path still scans
    pub fn scanned_labels(&self) -> Vec<LabelId> {
        let Some(subpaths) = self.rel.pathlist.first().and_then(Path::subpaths) else {
            return Vec::new();
        };
        subpaths
            .iter()
            .filter_map(|p| {
                self.children
                    .iter()
                    .find(|(_, rti)| *rti == p.parent)
                    .map(|(label, _)| *label)
            })
            .collect()
    }
}

/// Child scan cost used by the fixture: fixed startup, total linear in rows
pub fn child_scan(rti: RtIndex, rows: f64) -> Path {
    Path::seq_scan(rti, rows, 0.5, rows / 10.0 + 1.0)
}

/// Build `variable`'s scan over `root_label` with one child per partition
///
/// The relation gets an Append path (a MergeAppend when `ordered`) and an
/// unordered partial Append, and its row estimate is the sum of the children.
pub fn polymorphic_scan(
    variable: &str,
    root_label: &LabelRecord,
    partitions: &[(&LabelRecord, f64)],
    ordered: bool,
) -> PolymorphicScan {
    let mut root = PlannerInfo::new();
    let rti = root.add_rte(
        RangeTableEntry::relation(root_label.relation_id, root_label.name.as_str(), true)
            .with_alias(variable),
    );

    let mut children = Vec::new();
    let mut subpaths = Vec::new();
    for (label, rows) in partitions {
        let child = root.add_rte(RangeTableEntry::relation(
            label.relation_id,
            label.name.as_str(),
            false,
        ));
        children.push((label.label_id, child));
        subpaths.push(child_scan(child, *rows));
    }

    let total_rows = partitions.iter().map(|(_, rows)| rows).sum();
    let mut rel = RelOptInfo::base(rti, total_rows);
    if ordered {
        let keys = vec![format!("{}.id", variable)];
        rel.add_path(Path::merge_append(rti, subpaths.clone(), keys));
    } else {
        rel.add_path(Path::append(rti, subpaths.clone(), Vec::new()));
    }
    rel.add_partial_path(Path::append(rti, subpaths, Vec::new()));
    rel.set_cheapest();

    PolymorphicScan {
        root,
        rti,
        rel,
        children,
    }
}
