//! Data access for CLI commands.
//!
//! Every command runs over `FallbackStore<RemoteStore, RedbStore>`: the
//! server when it answers, the context's local store from the first
//! failure onward. Commands never see which side served them.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use buziz_kv::{FallbackStore, KVStore, RedbStore, RemoteStore};

use crate::config::Context;

pub fn open(ctx: &Context) -> Result<Arc<dyn KVStore>> {
    if ctx.server.is_empty() {
        anyhow::bail!(
            "No server URL set for context \"{}\". Run `buziz context create {} --server <url>`.",
            ctx.name,
            ctx.name
        );
    }

    let remote = RemoteStore::new(&ctx.server, &ctx.token)
        .map_err(|e| anyhow::anyhow!("cannot build remote client: {e}"))?;

    let data_dir = if ctx.data_dir.is_empty() {
        crate::config::dirs_path().join(&ctx.name)
    } else {
        PathBuf::from(&ctx.data_dir)
    };
    std::fs::create_dir_all(&data_dir)?;
    let local = RedbStore::open(&data_dir.join("data.redb"))
        .map_err(|e| anyhow::anyhow!("cannot open local store: {e}"))?;

    let store = FallbackStore::connect(remote, local);
    if store.is_degraded() {
        eprintln!("warning: server unreachable, using local data at {}", data_dir.display());
    }
    Ok(Arc::new(store))
}
