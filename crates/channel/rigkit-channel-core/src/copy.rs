//! Batch channel copy between two objects.

use serde::{Deserialize, Serialize};

use crate::error::ChannelError;
use crate::host::ChannelStore;
use crate::ids::{ChannelRef, ObjectId};
use crate::reader::{read_pack_by_name, ReadMode};
use crate::writer::{write_pack_by_name, EnvelopeWriteMode, WriteMode, WriteOptions};

/// Options for one batch copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CopyOptions {
    pub read_mode: ReadMode,
    pub write_mode: WriteMode,
    pub envelope_mode: EnvelopeWriteMode,
    /// Also copy each destination channel back onto its source (a swap when
    /// combined with `negate`, as in pose mirroring between sides).
    pub mutual: bool,
    /// Negate values and slopes on read.
    pub negate: bool,
    /// Create missing destination channels instead of recording a failure.
    pub add_if_missing: bool,
    /// Time that single-key writes land at.
    pub write_time: f64,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            read_mode: ReadMode::default(),
            write_mode: WriteMode::default(),
            envelope_mode: EnvelopeWriteMode::default(),
            mutual: false,
            negate: false,
            add_if_missing: false,
            write_time: 0.0,
        }
    }
}

/// What a batch copy did. Per-pair failures are recorded here and never
/// stop the batch.
#[derive(Debug, Default)]
pub struct CopyReport {
    pub copied: usize,
    pub failures: Vec<(String, ChannelError)>,
}

impl CopyReport {
    /// False only when every attempted pair failed.
    pub fn ok(&self) -> bool {
        self.copied > 0 || self.failures.is_empty()
    }

    pub fn merge(&mut self, other: CopyReport) {
        self.copied += other.copied;
        self.failures.extend(other.failures);
    }
}

fn write_options(opts: &CopyOptions) -> WriteOptions {
    WriteOptions {
        mode: opts.write_mode,
        envelope_mode: opts.envelope_mode,
        write_time: opts.write_time,
    }
}

/// One source→destination pair. Under `mutual` both ends are read before
/// either write, so the forward write cannot clobber the reverse read. A
/// destination that does not exist yet has nothing to copy back, so the
/// reverse leg is skipped; the forward write still runs and may create it.
fn copy_pair<S: ChannelStore + ?Sized>(
    store: &mut S,
    src: ObjectId,
    dst: ObjectId,
    src_name: &str,
    dst_name: &str,
    opts: &CopyOptions,
) -> Result<(), ChannelError> {
    let forward = read_pack_by_name(store, src, src_name, opts.read_mode, opts.negate)?;
    let reverse = if opts.mutual {
        match read_pack_by_name(store, dst, dst_name, opts.read_mode, opts.negate) {
            Ok(pack) => Some(pack),
            Err(ChannelError::ChannelNotFound(_)) => None,
            Err(err) => return Err(err),
        }
    } else {
        None
    };

    let wopts = write_options(opts);
    write_pack_by_name(store, dst, dst_name, &forward, &wopts, opts.add_if_missing)?;
    if let Some(reverse) = reverse {
        write_pack_by_name(store, src, src_name, &reverse, &wopts, opts.add_if_missing)?;
    }
    Ok(())
}

/// Copy channels from `src` to `dst` within one store.
///
/// Names are paired positionally; `dst_names` defaults to `src_names`, and
/// mismatched list lengths truncate to the shorter one. A pair that fails
/// to read or write is logged, recorded in the report, and the batch moves
/// on to the next pair.
pub fn copy_channels<S, A, B>(
    store: &mut S,
    src: ObjectId,
    dst: ObjectId,
    src_names: &[A],
    dst_names: Option<&[B]>,
    opts: &CopyOptions,
) -> CopyReport
where
    S: ChannelStore + ?Sized,
    A: AsRef<str>,
    B: AsRef<str>,
{
    let mut report = CopyReport::default();
    let pairs = match dst_names {
        Some(dst_names) => src_names.len().min(dst_names.len()),
        None => src_names.len(),
    };

    for i in 0..pairs {
        let src_name = src_names[i].as_ref();
        let dst_name = match dst_names {
            Some(dst_names) => dst_names[i].as_ref(),
            None => src_name,
        };
        match copy_pair(store, src, dst, src_name, dst_name, opts) {
            Ok(()) => report.copied += 1,
            Err(err) => {
                log::warn!("channel copy {src_name:?} -> {dst_name:?} failed: {err}");
                report.failures.push((src_name.to_string(), err));
            }
        }
    }
    report
}

/// Copy every channel the source object has, matched by name.
pub fn copy_all_channels<S: ChannelStore + ?Sized>(
    store: &mut S,
    src: ObjectId,
    dst: ObjectId,
    opts: &CopyOptions,
) -> CopyReport {
    let count = store.channel_count(src);
    let mut names = Vec::with_capacity(count as usize);
    for index in 0..count {
        match store.channel_name(ChannelRef::new(src, index)) {
            Ok(name) => names.push(name),
            Err(err) => log::warn!("unreadable channel {index} on {src:?}: {err}"),
        }
    }
    copy_channels(store, src, dst, &names, None::<&[&str]>, opts)
}
