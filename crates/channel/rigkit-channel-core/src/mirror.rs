//! Which channels change sign when a pose crosses the mirror plane.

use serde::{Deserialize, Serialize};

use crate::copy::{copy_channels, CopyOptions, CopyReport};
use crate::host::ChannelStore;
use crate::ids::ObjectId;

/// Name-based negation rules for an X-axis mirror plane.
///
/// `flip_always` channels negate on every mirrored object; `flip_on_center`
/// channels negate only when source and destination are the same object
/// (an on-plane item mirrored onto itself).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MirrorRules {
    pub flip_always: Vec<String>,
    pub flip_on_center: Vec<String>,
}

impl Default for MirrorRules {
    fn default() -> Self {
        Self {
            flip_always: vec!["pos.X".to_string()],
            flip_on_center: vec!["rot.Y".to_string(), "rot.Z".to_string()],
        }
    }
}

impl MirrorRules {
    /// Whether the named channel changes sign when mirrored.
    pub fn negates(&self, name: &str, on_center: bool) -> bool {
        if self.flip_always.iter().any(|n| n == name) {
            return true;
        }
        on_center && self.flip_on_center.iter().any(|n| n == name)
    }
}

/// Mirror the named channels from `src` onto `dst`, negating the channels
/// the rules single out. `src == dst` is the on-plane case. Channels with
/// no counterpart on the destination fail pairwise like any other copy, so
/// they are skipped without aborting the batch.
pub fn mirror_copy<S, N>(
    store: &mut S,
    src: ObjectId,
    dst: ObjectId,
    names: &[N],
    rules: &MirrorRules,
    opts: &CopyOptions,
) -> CopyReport
where
    S: ChannelStore + ?Sized,
    N: AsRef<str>,
{
    let on_center = src == dst;
    let (flipped, plain): (Vec<&str>, Vec<&str>) = names
        .iter()
        .map(AsRef::as_ref)
        .partition(|name| rules.negates(name, on_center));

    let mut report = copy_channels(
        store,
        src,
        dst,
        &flipped,
        None::<&[&str]>,
        &CopyOptions {
            negate: true,
            ..opts.clone()
        },
    );
    report.merge(copy_channels(
        store,
        src,
        dst,
        &plain,
        None::<&[&str]>,
        &CopyOptions {
            negate: false,
            ..opts.clone()
        },
    ));
    report
}
