//! DB operation interface logic, primarily for generating database operation shims.
//!
//! The macro here manages the indirection required to spawn async requests onto a thread pool and
//! execute blocking calls locally.

use beacon_db_types::DbResult;

/// Handle for receiving a result from a database operation.
pub type DbRecv<T> = tokio::sync::oneshot::Receiver<DbResult<T>>;

/// Generates a `Context<D>` around a database and an `Ops` struct exposing every listed method
/// as `foo_async`, `foo_blocking` and `foo_chan` variants.
///
/// ```ignore
/// inst_ops_simple! {
///     (<D: CheckpointStateDatabase> => CheckpointStateOps) {
///         get_state_blob(checkpoint: Checkpoint) => Option<Vec<u8>>;
///         del_state_blob(checkpoint: Checkpoint) => bool;
///     }
/// }
/// ```
///
/// Async calls are executed on the thread pool and their result is delivered over a oneshot
/// channel. If the worker drops the sender, the caller gets [`DbError::WorkerFailedStrangely`].
///
/// [`DbError::WorkerFailedStrangely`]: beacon_db_types::DbError::WorkerFailedStrangely
macro_rules! inst_ops_simple {
    {
        (< $tparam:ident : $tpconstr:tt > => $base:ident) {
            $($iname:ident($($aname:ident: $aty:ty),*) => $ret:ty;)*
        }
    } => {
        #[derive(Debug)]
        pub struct Context<$tparam: $tpconstr> {
            db: ::std::sync::Arc<$tparam>,
        }

        impl<$tparam: $tpconstr> Context<$tparam> {
            pub fn new(db: ::std::sync::Arc<$tparam>) -> Self {
                Self { db }
            }

            pub fn into_ops(self, pool: ::threadpool::ThreadPool) -> $base {
                $base::new(pool, ::std::sync::Arc::new(self))
            }
        }

        pub struct $base {
            pool: ::threadpool::ThreadPool,
            inner: ::std::sync::Arc<dyn ShimTrait>,
        }

        impl ::std::fmt::Debug for $base {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.debug_struct(stringify!($base))
                    .field("pool", &self.pool)
                    .finish_non_exhaustive()
            }
        }

        ::paste::paste! {
            impl $base {
                pub fn new<$tparam: $tpconstr>(
                    pool: ::threadpool::ThreadPool,
                    ctx: ::std::sync::Arc<Context<$tparam>>,
                ) -> Self {
                    Self {
                        pool,
                        inner: ::std::sync::Arc::new(Inner { ctx }),
                    }
                }

                $(
                    pub async fn [<$iname _async>] (&self, $($aname: $aty),*) -> ::beacon_db_types::DbResult<$ret> {
                        let resp_rx = self.inner. [<$iname _chan>] (&self.pool, $($aname),*);
                        match resp_rx.await {
                            Ok(v) => v,
                            Err(_e) => Err(::beacon_db_types::DbError::WorkerFailedStrangely),
                        }
                    }

                    pub fn [<$iname _blocking>] (&self, $($aname: $aty),*) -> ::beacon_db_types::DbResult<$ret> {
                        self.inner. [<$iname _blocking>] ($($aname),*)
                    }

                    pub fn [<$iname _chan>] (&self, $($aname: $aty),*) -> $crate::exec::DbRecv<$ret> {
                        self.inner. [<$iname _chan>] (&self.pool, $($aname),*)
                    }
                )*
            }

            trait ShimTrait: Sync + Send + 'static {
                $(
                    fn [<$iname _blocking>] (&self, $($aname: $aty),*) -> ::beacon_db_types::DbResult<$ret>;
                    fn [<$iname _chan>] (&self, pool: &::threadpool::ThreadPool, $($aname: $aty),*) -> $crate::exec::DbRecv<$ret>;
                )*
            }

            struct Inner<$tparam: $tpconstr> {
                ctx: ::std::sync::Arc<Context<$tparam>>,
            }

            impl<$tparam: $tpconstr> ShimTrait for Inner<$tparam> {
                $(
                    fn [<$iname _blocking>] (&self, $($aname: $aty),*) -> ::beacon_db_types::DbResult<$ret> {
                        $iname(&self.ctx, $($aname),*)
                    }

                    fn [<$iname _chan>] (&self, pool: &::threadpool::ThreadPool, $($aname: $aty),*) -> $crate::exec::DbRecv<$ret> {
                        let (resp_tx, resp_rx) = ::tokio::sync::oneshot::channel();
                        let ctx = self.ctx.clone();

                        pool.execute(move || {
                            let res = $iname(&ctx, $($aname),*);
                            if resp_tx.send(res).is_err() {
                                ::tracing::warn!("failed to send response");
                            }
                        });

                        resp_rx
                    }
                )*
            }
        }

        $(
            fn $iname<$tparam: $tpconstr>(context: &Context<$tparam>, $($aname: $aty),*) -> ::beacon_db_types::DbResult<$ret> {
                context.db.as_ref().$iname($($aname),*)
            }
        )*
    };
}

pub(crate) use inst_ops_simple;
