use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use pulse_surface::{PillPhase, PillStack, SurfaceRef};
use serde_json::json;

use super::*;
use crate::{ManualClock, SEEN_CEILING};

fn registry() -> ChannelRegistry {
	ChannelRegistry::new()
		.with_rng(StdRng::seed_from_u64(11))
		.with_clock(ManualClock::new(1_714_650_000_000))
}

fn mount_stack(registry: &mut ChannelRegistry, channel: &str, max_visible: usize) -> Rc<RefCell<PillStack>> {
	let stack = PillStack::shared();
	let surface: SurfaceRef = stack.clone();
	registry.mount(&MountOptions::new(channel).container(surface).max_visible(max_visible));
	stack
}

fn ids(ids: &[&str]) -> Vec<Reaction> {
	ids.iter().map(|id| Reaction::with_id(*id)).collect()
}

fn keys(stack: &Rc<RefCell<PillStack>>) -> Vec<String> {
	stack.borrow().keys().into_iter().map(str::to_string).collect()
}

#[test]
fn distinct_reactions_render_in_order() {
	let mut registry = registry();
	let stack = mount_stack(&mut registry, "feed", 10);
	assert_eq!(registry.ingest(Some("feed"), &ids(&["a", "b", "c"])), 3);
	assert_eq!(keys(&stack), vec!["a", "b", "c"]);
}

#[test]
fn same_record_twice_renders_once() {
	let mut registry = registry();
	let stack = mount_stack(&mut registry, "feed", 10);
	let batch = ids(&["a"]);
	assert_eq!(registry.ingest(Some("feed"), &batch), 1);
	assert_eq!(registry.ingest(Some("feed"), &batch), 0);
	assert_eq!(keys(&stack), vec!["a"]);
}

#[test]
fn duplicate_within_batch_renders_first_only() {
	let mut registry = registry();
	let stack = mount_stack(&mut registry, "feed", 10);
	let record = Reaction {
		label: Some("Great".into()),
		response_key: Some("pulse".into()),
		value: Some("3".into()),
		timestamp: Some("2024-05-02T11:45:10".into()),
		..Reaction::default()
	};
	assert_eq!(registry.ingest(Some("feed"), &[record.clone(), record]), 1);
	assert_eq!(stack.borrow().len(), 1);
}

#[test]
fn alerts_channel_evicts_oldest() {
	let mut registry = registry();
	let stack = mount_stack(&mut registry, "alerts", 2);
	registry.ingest(Some("alerts"), &ids(&["a", "b", "c"]));
	assert_eq!(keys(&stack), vec!["b", "c"]);
	assert!(registry.channel("alerts").unwrap().seen().contains("a"));
}

#[test]
fn unparseable_timestamp_renders_without_time() {
	let mut registry = registry();
	let stack = mount_stack(&mut registry, "feed", 4);
	let record = Reaction {
		id: Some("t".into()),
		timestamp: Some("not-a-date".into()),
		..Reaction::default()
	};
	assert_eq!(registry.ingest(Some("feed"), &[record]), 1);

	let stack = stack.borrow();
	let pill = stack.pills().next().unwrap();
	assert_eq!(pill.label(), crate::DEFAULT_LABEL);
	assert_eq!(pill.emoji(), crate::DEFAULT_EMOJI);
	assert_eq!(pill.meta(), None);
	assert_eq!(pill.phase(), PillPhase::Visible);
}

#[test]
fn unmounted_channel_is_ignored() {
	let mut registry = registry();
	let stack = mount_stack(&mut registry, "feed", 4);
	assert_eq!(registry.ingest(Some("other"), &ids(&["a"])), 0);
	assert_eq!(registry.ingest(None, &ids(&["a"])), 0);
	assert!(stack.borrow().is_empty());
	assert!(registry.channel("other").is_none());
}

#[test]
fn empty_batch_is_ignored() {
	let mut registry = registry();
	let stack = mount_stack(&mut registry, "feed", 4);
	assert_eq!(registry.ingest(Some("feed"), &[]), 0);
	assert!(stack.borrow().is_empty());
}

#[test]
fn default_channel_applies_to_both_entry_points() {
	let mut registry = registry();
	let stack = PillStack::shared();
	let surface: SurfaceRef = stack.clone();
	registry.mount(&MountOptions::default().container(surface));
	assert_eq!(registry.channel_names(), vec![DEFAULT_CHANNEL]);
	assert_eq!(registry.ingest(None, &ids(&["a"])), 1);
	assert_eq!(registry.ingest(Some(""), &ids(&["b"])), 1);
	assert_eq!(keys(&stack), vec!["a", "b"]);
}

#[test]
fn mount_without_surface_is_ignored() {
	let mut registry = registry();
	assert!(matches!(registry.try_mount(&MountOptions::new("feed")), Err(MountError::NoContainer)));
	assert!(matches!(
		registry.try_mount(&MountOptions::new("feed").container_id("nowhere")),
		Err(MountError::UnknownContainer(id)) if id == "nowhere"
	));
	registry.mount(&MountOptions::new("feed"));
	assert!(registry.channel_names().is_empty());
}

#[test]
fn container_id_resolves_through_directory() {
	let mut registry = registry();
	let stack = PillStack::shared();
	registry.directory_mut().insert("strip", stack.clone());
	registry.mount(&MountOptions::new("feed").container_id("strip"));
	registry.ingest(Some("feed"), &ids(&["a"]));
	assert_eq!(keys(&stack), vec!["a"]);
}

#[test]
fn direct_container_wins_over_container_id() {
	let mut registry = registry();
	let listed = PillStack::shared();
	let direct = PillStack::shared();
	registry.directory_mut().insert("strip", listed.clone());
	let surface: SurfaceRef = direct.clone();
	registry.mount(&MountOptions::new("feed").container(surface).container_id("strip"));
	registry.ingest(Some("feed"), &ids(&["a"]));
	assert!(listed.borrow().is_empty());
	assert_eq!(keys(&direct), vec!["a"]);
}

#[test]
fn remount_updates_settings_and_keeps_seen_cache() {
	let mut registry = registry();
	let stack = mount_stack(&mut registry, "feed", 4);
	registry.ingest(Some("feed"), &ids(&["a", "b", "c"]));

	let surface: SurfaceRef = stack.clone();
	registry.mount(&MountOptions::new("feed").container(surface).max_visible(1).duration_ms(9000));
	let context = registry.channel("feed").unwrap();
	assert_eq!(context.max_visible(), 1);
	assert_eq!(context.duration_ms(), 9000);
	assert_eq!(context.seen().len(), 3);

	assert_eq!(registry.ingest(Some("feed"), &ids(&["a", "d"])), 1);
	assert_eq!(keys(&stack), vec!["d"]);
	let motion = stack.borrow().pills().next().unwrap().motion();
	assert!(motion.duration >= Duration::from_millis(8550));
}

#[test]
fn remount_on_new_surface_leaves_old_pills_behind() {
	let mut registry = registry();
	let old = mount_stack(&mut registry, "feed", 4);
	registry.ingest(Some("feed"), &ids(&["a"]));

	let new = mount_stack(&mut registry, "feed", 4);
	registry.ingest(Some("feed"), &ids(&["a", "b"]));
	assert_eq!(keys(&old), vec!["a"]);
	assert_eq!(keys(&new), vec!["b"]);
}

#[test]
fn finished_animation_removes_pill() {
	let mut registry = registry();
	let stack = PillStack::shared();
	let surface: SurfaceRef = stack.clone();
	registry.mount(&MountOptions::new("feed").container(surface).duration_ms(1));
	registry.ingest(Some("feed"), &ids(&["a", "b"]));

	assert_eq!(PillStack::advance(&stack, Duration::from_millis(3199)), 0);
	assert_eq!(stack.borrow().len(), 2);
	assert_eq!(PillStack::advance(&stack, Duration::from_millis(1)), 2);
	assert!(stack.borrow().is_empty());
}

#[test]
fn evicted_pill_never_fires_its_handler() {
	let mut registry = registry();
	let stack = PillStack::shared();
	let surface: SurfaceRef = stack.clone();
	registry.mount(&MountOptions::new("feed").container(surface).max_visible(1).duration_ms(1));
	registry.ingest(Some("feed"), &ids(&["a"]));
	PillStack::advance(&stack, Duration::from_millis(1000));
	registry.ingest(Some("feed"), &ids(&["b"]));

	assert_eq!(PillStack::advance(&stack, Duration::from_millis(2500)), 0);
	assert_eq!(keys(&stack), vec!["b"]);
}

#[test]
fn seen_cache_keeps_most_recent_ids() {
	let clock = Rc::new(ManualClock::new(0));
	let mut registry = ChannelRegistry::new()
		.with_rng(StdRng::seed_from_u64(5))
		.with_clock(Rc::clone(&clock));
	mount_stack(&mut registry, "feed", 4);

	for i in 0..400 {
		clock.advance(1);
		registry.ingest(Some("feed"), &[Reaction::with_id(format!("r{i}"))]);
	}

	let seen = registry.channel("feed").unwrap().seen();
	assert_eq!(seen.len(), SEEN_CEILING);
	assert!(!seen.contains("r79"));
	assert!(seen.contains("r80"));
	assert!(seen.contains("r399"));
}

#[test]
fn ingest_value_skips_falsy_entries() {
	let mut registry = registry();
	let stack = mount_stack(&mut registry, "feed", 10);
	let payload = json!([{"id": "a"}, null, false, 0, "", "junk", {"id": "b"}, {"id": "a"}]);
	assert_eq!(registry.ingest_value(Some("feed"), &payload), 2);
	assert_eq!(keys(&stack), vec!["a", "b"]);
}

#[test]
fn ingest_value_ignores_non_arrays() {
	let mut registry = registry();
	let stack = mount_stack(&mut registry, "feed", 10);
	assert_eq!(registry.ingest_value(Some("feed"), &json!(null)), 0);
	assert_eq!(registry.ingest_value(Some("feed"), &json!({"id": "a"})), 0);
	assert!(stack.borrow().is_empty());
}

#[test]
fn ingest_value_empty_array_is_noop() {
	let mut registry = registry();
	let stack = mount_stack(&mut registry, "feed", 10);
	assert_eq!(registry.ingest_value(Some("feed"), &json!([])), 0);
	assert!(stack.borrow().is_empty());
	assert!(registry.channel("feed").unwrap().seen().is_empty());
}

#[test]
fn empty_object_gets_a_fresh_identity_each_time() {
	let mut registry = registry();
	let stack = mount_stack(&mut registry, "feed", 10);
	assert_eq!(registry.ingest_value(Some("feed"), &json!([{}, {}])), 2);
	assert_eq!(stack.borrow().len(), 2);
}

#[test]
fn ingest_feed_envelope() {
	let mut registry = registry();
	let stack = mount_stack(&mut registry, "pulse", 4);
	let feed = ReactionFeed::from_json_str(
		r#"{"reactions": [
			{"id": "x1", "emoji": "😋", "label": "Great", "question_set": "lunch_pulse", "title": "Lunch pulse"},
			{"id": "x2", "emoji": "🙂", "label": "Okay"}
		]}"#,
	)
	.unwrap();
	assert_eq!(registry.ingest_feed(Some("pulse"), &feed), 2);

	let stack = stack.borrow();
	let labels: Vec<_> = stack.pills().map(|p| (p.emoji(), p.label(), p.meta())).collect();
	assert_eq!(labels, vec![("😋", "Great", Some("Lunch pulse")), ("🙂", "Okay", None)]);
}

#[test]
fn mount_value_ignores_missing_options() {
	let mut registry = registry();
	registry.mount_value(&json!(null));
	registry.mount_value(&json!("alerts"));
	registry.mount_value(&json!({"channel": "alerts", "maxVisible": "two"}));
	assert!(registry.channel_names().is_empty());
}

#[test]
fn mount_value_resolves_container_id() {
	let mut registry = registry();
	let stack = PillStack::shared();
	registry.directory_mut().insert("alerts-strip", stack.clone());
	registry.mount_value(&json!({"channel": "alerts", "containerId": "alerts-strip", "maxVisible": 2}));
	assert_eq!(registry.channel("alerts").map(ChannelContext::max_visible), Some(2));
	registry.ingest(Some("alerts"), &ids(&["a", "b", "c"]));
	assert_eq!(keys(&stack), vec!["b", "c"]);
}

#[test]
fn mount_all_mounts_resolvable_channels() {
	let mut registry = registry();
	registry.directory_mut().insert("lobby", PillStack::shared());
	let config = PulseConfig::from_toml_str(
		r#"
		[[channel]]
		channel = "lobby"
		containerId = "lobby"

		[[channel]]
		channel = "kitchen"
		containerId = "missing"
		"#,
	)
	.unwrap();
	registry.mount_all(&config);
	assert_eq!(registry.channel_names(), vec!["lobby"]);
}

#[test]
fn seeded_registries_render_identically() {
	let motions = |seed| {
		let mut registry = ChannelRegistry::new().with_rng(StdRng::seed_from_u64(seed));
		let stack = mount_stack(&mut registry, "feed", 10);
		registry.ingest(Some("feed"), &ids(&["a", "b", "c"]));
		let stack = stack.borrow();
		stack.pills().map(|p| p.motion()).collect::<Vec<_>>()
	};
	assert_eq!(motions(9), motions(9));
}

proptest! {
	/// Visible count never exceeds capacity and the survivors are the most
	/// recent novel reactions.
	#[test]
	fn capacity_and_fifo_eviction(max_visible in 1usize..6, picks in prop::collection::vec(0u8..12, 0..40)) {
		let mut registry = registry();
		let stack = mount_stack(&mut registry, "feed", max_visible);

		let mut novel = Vec::new();
		for chunk in picks.chunks(3) {
			let batch: Vec<_> = chunk.iter().map(|n| Reaction::with_id(format!("r{n}"))).collect();
			registry.ingest(Some("feed"), &batch);
			prop_assert!(stack.borrow().len() <= max_visible);
			for reaction in &batch {
				let id = reaction.id.clone().unwrap();
				if !novel.contains(&id) {
					novel.push(id);
				}
			}
		}

		let expected: Vec<String> = novel[novel.len().saturating_sub(max_visible)..].to_vec();
		prop_assert_eq!(keys(&stack), expected);
	}

	/// The seen cache never grows past its ceiling.
	#[test]
	fn seen_cache_is_bounded(batches in prop::collection::vec(1usize..120, 1..8)) {
		let mut registry = registry();
		mount_stack(&mut registry, "feed", 4);
		let mut next = 0usize;
		for size in batches {
			let batch: Vec<_> = (next..next + size).map(|i| Reaction::with_id(format!("r{i}"))).collect();
			next += size;
			registry.ingest(Some("feed"), &batch);
			let seen = registry.channel("feed").unwrap().seen().len();
			prop_assert_eq!(seen, next.min(SEEN_CEILING));
		}
	}
}
