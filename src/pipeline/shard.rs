/// Split `files` into `parts` contiguous shards in input order.
///
/// The first `len % parts` shards get one extra file, so shard sizes differ by at most one and
/// trailing shards may be empty when there are fewer files than parts. `parts == 0` is treated
/// as 1.
pub fn shard_files<T: Clone>(files: &[T], parts: usize) -> Vec<Vec<T>> {
    let parts = parts.max(1);
    let base = files.len() / parts;
    let extra = files.len() % parts;

    let mut shards = Vec::with_capacity(parts);
    let mut start = 0;
    for i in 0..parts {
        let len = base + usize::from(i < extra);
        shards.push(files[start..start + len].to_vec());
        start += len;
    }
    shards
}
