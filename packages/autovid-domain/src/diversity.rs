use std::collections::HashSet;

/// Row shape the listing diversity pass needs.
pub trait ChannelItem {
	fn channel_id(&self) -> &str;

	fn channel_title(&self) -> &str;

	fn is_pinned(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ChannelKey {
	Id(String),
	Title(String),
}

/// Channel id when present, else the case-folded title. Rows with neither are never grouped.
fn channel_key<T>(item: &T) -> Option<ChannelKey>
where
	T: ChannelItem,
{
	let id = item.channel_id().trim();

	if !id.is_empty() {
		return Some(ChannelKey::Id(id.to_string()));
	}

	let title = item.channel_title().trim();

	(!title.is_empty()).then(|| ChannelKey::Title(title.to_lowercase()))
}

/// One-per-channel selection with in-order backfill.
///
/// Candidates are visited in their given order. A candidate is kept when it is pinned or its
/// channel has not been used yet. Channels are identified by id, falling back to the title.
/// Remaining slots are filled from the skipped candidates, still in their original order.
pub fn select_one_per_channel<T>(candidates: Vec<T>, count: usize) -> Vec<T>
where
	T: ChannelItem,
{
	if count == 0 {
		return Vec::new();
	}

	let mut selected = Vec::with_capacity(count.min(candidates.len()));
	let mut leftovers = Vec::new();
	let mut used_channels: HashSet<ChannelKey> = HashSet::new();

	for candidate in candidates {
		if selected.len() >= count {
			leftovers.push(candidate);

			continue;
		}

		let fresh = match channel_key(&candidate) {
			Some(channel) => used_channels.insert(channel),
			None => true,
		};

		if candidate.is_pinned() || fresh {
			selected.push(candidate);
		} else {
			leftovers.push(candidate);
		}
	}

	for candidate in leftovers {
		if selected.len() >= count {
			break;
		}

		selected.push(candidate);
	}

	selected
}
