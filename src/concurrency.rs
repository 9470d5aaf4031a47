//! Concurrency helper: limit the number of input files processed in parallel while
//! handing results back in input order.

use crate::paths::FileJob;
use anyhow::Result;
use rayon::prelude::*;

/// Run `work` over `files`, at most `limit` at a time, and feed each result to
/// `sink` in the original file order. `limit <= 1` is fully sequential.
pub fn process_files_limited<T, W, S>(files: &[FileJob], limit: usize, work: W, mut sink: S) -> Result<()>
where
    T: Send,
    W: Sync + Fn(&FileJob) -> Result<T>,
    S: FnMut(&FileJob, T) -> Result<()>,
{
    if limit <= 1 {
        for job in files {
            let out = work(job)?;
            sink(job, out)?;
        }
        return Ok(());
    }
    for chunk in files.chunks(limit) {
        let outs = chunk.par_iter().map(|job| work(job)).collect::<Result<Vec<_>>>()?;
        for (job, out) in chunk.iter().zip(outs) {
            sink(job, out)?;
        }
    }
    Ok(())
}
