//! Benchmark for change ops, entity merging and edit conflict resolution.
//!
//! Runs on a synthetic population of items, or on a JSON array of entities
//! given as the first argument.

use std::fs;
use std::sync::Arc;
use std::time::{Duration, Instant};

use entity_changeops::changeop::{ChangeOp, ChangeOpFactory, ChangeOps};
use entity_changeops::edit::{
    EditContext, EditEntity, EditTarget, EntityRevisionLookup, EntityStore, GroupRateLimiter,
    InMemoryEntityStore, RightsPermissionChecker, User,
};
use entity_changeops::model::builder::{ItemBuilder, StatementBuilder};
use entity_changeops::validate::PropertyDataTypes;
use entity_changeops::{
    DataType, DataValue, EditConflictResolver, Entity, ItemId, PropertyId, Settings, Snak,
    Statement, Summary,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ITEMS: u64 = 10_000;
const NAME: PropertyId = PropertyId::new(1);
const CODE: PropertyId = PropertyId::new(2);

fn synthetic_items(count: u64) -> Vec<Entity> {
    (1..=count)
        .map(|n| {
            ItemBuilder::new()
                .id(ItemId::new(n))
                .label("en", &format!("Item {n}"))
                .label("de", &format!("Gegenstand {n}"))
                .description("en", &format!("synthetic item number {n}"))
                .aliases("en", [format!("I{n}").as_str(), format!("item-{n}").as_str()])
                .site_link("enwiki", &format!("Item {n}"), Vec::<ItemId>::new())
                .statement(
                    StatementBuilder::string(NAME, &format!("name-{n}"))
                        .guid(&format!("Q{n}$00000000-0000-4000-8000-{n:012X}")),
                )
                .build()
        })
        .collect()
}

fn load_items(path: &str) -> Vec<Entity> {
    let json = fs::read_to_string(path).expect("Failed to read entity file");
    let parse_start = Instant::now();
    let items: Vec<Entity> = serde_json::from_str(&json).expect("Failed to parse entities");
    info!(count = items.len(), elapsed = ?parse_start.elapsed(), path, "loaded entities");
    items
}

fn edit_ops(factory: &ChangeOpFactory, n: usize) -> ChangeOps {
    let mut ops = ChangeOps::new();
    ops.add(factory.new_set_label_op("fr", &format!("Objet {n}")));
    ops.add(factory.new_set_description_op("de", &format!("Gegenstand Nummer {n}")));
    ops.add(
        factory
            .new_add_aliases_op("en", &["bench alias"])
            .expect("alias count within limit"),
    );
    ops.add(factory.new_claim_op(
        Statement::new(Snak::value(CODE, DataValue::String(format!("code-{n}")))),
        None,
    ));
    ops.add(
        factory
            .new_site_link_op("dewiki", Some(format!("Gegenstand {n}").as_str()), None)
            .expect("dewiki is a known site"),
    );
    ops
}

fn per_item(total: Duration, count: usize) -> Duration {
    total / count.max(1) as u32
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let items = match std::env::args().nth(1) {
        Some(path) => load_items(&path),
        None => {
            let count = std::env::var("BENCH_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_ITEMS);
            synthetic_items(count)
        }
    };
    println!("Population: {} entities", items.len());

    let mut data_types: PropertyDataTypes = PropertyDataTypes::from_entities(&items);
    data_types.add_property(NAME, DataType::String);
    data_types.add_property(CODE, DataType::String);
    let factory = ChangeOpFactory::new(Settings::default(), Arc::new(data_types));

    // Validate + apply
    let mut edited = items.clone();
    let mut invalid = 0usize;
    let mut validate_time = Duration::ZERO;
    let mut apply_time = Duration::ZERO;
    for (n, entity) in edited.iter_mut().enumerate() {
        let mut ops = edit_ops(&factory, n);

        let start = Instant::now();
        let result = ops.validate(entity);
        validate_time += start.elapsed();
        if !result.is_valid() {
            invalid += 1;
            continue;
        }

        let start = Instant::now();
        let mut summary = Summary::new();
        if let Err(err) = ops.apply(entity, Some(&mut summary)) {
            warn!(id = ?entity.id(), %err, "apply failed");
        }
        apply_time += start.elapsed();
    }
    println!("\nValidate: {:?} total, {:?} per entity", validate_time, per_item(validate_time, items.len()));
    println!("Apply:    {:?} total, {:?} per entity", apply_time, per_item(apply_time, items.len()));
    if invalid > 0 {
        println!("  {} entities rejected by validation", invalid);
    }

    // Merge pairs: item 2k+1 into item 2k
    let mut merged = items.clone();
    let mut conflicts = 0usize;
    let mut moved = 0usize;
    let mut pairs = 0usize;
    let merge_start = Instant::now();
    for pair in merged.chunks_exact_mut(2) {
        let [to, from] = pair else { continue };
        let merge = match factory.new_merge_op(from, to, &["description"]) {
            Ok(merge) => merge,
            Err(err) => {
                warn!(%err, "skipping merge pair");
                continue;
            }
        };
        match merge.apply() {
            Ok(report) => {
                conflicts += report.conflicts.len();
                moved += report.moved_statements;
                pairs += 1;
            }
            Err(err) => warn!(%err, "merge failed"),
        }
    }
    let merge_time = merge_start.elapsed();
    println!(
        "\nMerge: {} pairs in {:?} ({:?} per pair)",
        pairs,
        merge_time,
        per_item(merge_time, pairs)
    );
    println!("  {} statements moved, {} conflicts left", moved, conflicts);

    // Three-way conflict resolution
    let resolver = EditConflictResolver::new();
    let mut resolved = 0usize;
    let resolve_start = Instant::now();
    for (base, new) in items.iter().zip(&edited) {
        let mut current = base.clone();
        current.fingerprint_mut().labels.set("es", "actualizado");
        if resolver.fix_edit_conflict(base, &current, new).is_some() {
            resolved += 1;
        }
    }
    let resolve_time = resolve_start.elapsed();
    println!(
        "\nConflict resolution: {}/{} resolved in {:?} ({:?} per entity)",
        resolved,
        items.len(),
        resolve_time,
        per_item(resolve_time, items.len())
    );

    // Full save pipeline against the in-memory store
    let settings = Settings::default();
    let store = Arc::new(InMemoryEntityStore::new());
    for entity in &items {
        store
            .save_entity(entity, &Summary::new(), true, None)
            .expect("Failed to seed store");
    }
    let context = EditContext::new(
        store.clone(),
        Arc::new(RightsPermissionChecker::from_settings(&settings)),
        Arc::new(GroupRateLimiter::from_settings(&settings)),
    );
    let user = User::new("Bench").with_groups(["bot"]);
    let mut saved = 0usize;
    let save_start = Instant::now();
    for (n, entity) in items.iter().enumerate() {
        let Some(id) = entity.id() else { continue };
        let base = store.latest_revision_id(id);
        let mut edit = EditEntity::new(context.clone(), user.clone(), EditTarget::Existing { id, base });
        match edit.attempt_save(&mut edit_ops(&factory, n), Summary::for_module("bench")) {
            Ok(status) if status.is_ok() => saved += 1,
            Ok(status) => warn!(%id, messages = ?status.messages(), "save refused"),
            Err(err) => warn!(%id, %err, "save failed"),
        }
    }
    let save_time = save_start.elapsed();
    println!(
        "\nSave pipeline: {}/{} saved in {:?} ({:?} per entity)",
        saved,
        items.len(),
        save_time,
        per_item(save_time, items.len())
    );
}
