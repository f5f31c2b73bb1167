use std::fmt::Display;

use libipld::Cid;
use ucanfs_store::Storage;

use crate::{
    CidLog, Depot, ReferenceError, ReferenceResult, SemVer, Support, SupportedVersions,
    UserMessages, UNMARKED_VERSION,
};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Whether the remote data root pointer can be reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    /// The remote pointer can be looked up.
    Online,

    /// Only local state is available.
    Offline,
}

/// Why a root was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootReason {
    /// Offline, so the newest local root is used.
    Offline,

    /// Nothing is published yet, so the newest local root is used.
    NoRemotePointer,

    /// Nothing is published or recorded; a new file system has to be created.
    CreateNew,

    /// The published root is the newest local root.
    RemoteUpToDate,

    /// The published root is older than the newest local root.
    RemoteLagging {
        /// How many local entries are newer than the published root.
        behind: usize,
    },

    /// The published root is not in the local log; it was appended.
    RemoteNewer,
}

/// The authoritative data root and why it was chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedRoot {
    /// The root to load, or `None` when a new file system has to be created.
    pub cid: Option<Cid>,

    /// Why it was chosen.
    pub reason: RootReason,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Chooses between the newest root in `log` and the `remote` pointer.
///
/// A published root missing from the log is taken as newer and appended; otherwise the log is
/// left untouched. The remote pointer is ignored when `connectivity` is offline.
pub async fn select_root<S>(
    log: &mut CidLog<S>,
    remote: Option<Cid>,
    connectivity: Connectivity,
) -> ReferenceResult<SelectedRoot>
where
    S: Storage,
{
    let newest = log.newest().copied();

    let selected = match (connectivity, remote) {
        (Connectivity::Offline, _) => SelectedRoot {
            cid: Some(newest.ok_or(ReferenceError::NoLocalRoot)?),
            reason: RootReason::Offline,
        },
        (Connectivity::Online, None) => SelectedRoot {
            cid: newest,
            reason: match newest {
                Some(_) => RootReason::NoRemotePointer,
                None => RootReason::CreateNew,
            },
        },
        (Connectivity::Online, Some(remote)) => match log.index_of(&remote) {
            Some(index) if index + 1 == log.len() => SelectedRoot {
                cid: Some(remote),
                reason: RootReason::RemoteUpToDate,
            },
            Some(index) => SelectedRoot {
                cid: newest,
                reason: RootReason::RemoteLagging {
                    behind: log.len() - 1 - index,
                },
            },
            None => {
                log.add(remote).await?;
                SelectedRoot {
                    cid: Some(remote),
                    reason: RootReason::RemoteNewer,
                }
            }
        },
    };

    match selected.cid {
        Some(cid) => tracing::info!(%cid, reason = %selected.reason, "selected data root"),
        None => tracing::info!(reason = %selected.reason, "no data root, creating a new one"),
    }

    Ok(selected)
}

/// Checks that the file system at `root` has a supported version.
///
/// A root without a marker is taken to be [`UNMARKED_VERSION`]; an unparsable marker is treated as
/// too high. On an unsupported version the matching `messages` hook is awaited before the error is
/// returned.
pub async fn check_version(
    depot: &dyn Depot,
    messages: &dyn UserMessages,
    supported: &SupportedVersions,
    root: &Cid,
) -> ReferenceResult<SemVer> {
    let marker = depot
        .file_system_version(root)
        .await?
        .unwrap_or_else(|| UNMARKED_VERSION.to_string());

    let too_high = || ReferenceError::VersionTooHigh {
        version: marker.clone(),
        max: supported.max().to_string(),
    };

    let Ok(version) = marker.parse::<SemVer>() else {
        messages.version_too_high(&marker).await;
        return Err(too_high());
    };

    match supported.support(&version) {
        Support::Supported => {
            tracing::debug!(%root, %version, "file system version supported");
            Ok(version)
        }
        Support::TooHigh => {
            messages.version_too_high(&marker).await;
            Err(too_high())
        }
        Support::TooLow => {
            messages.version_too_low(&marker).await;
            Err(ReferenceError::VersionTooLow {
                version: marker.clone(),
                min: supported.min().to_string(),
            })
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Display for RootReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Offline => write!(f, "working offline, using local root"),
            Self::NoRemotePointer => write!(f, "nothing published, using local root"),
            Self::CreateNew => write!(f, "nothing published or recorded"),
            Self::RemoteUpToDate => write!(f, "published root is up to date"),
            Self::RemoteLagging { behind: 1 } => {
                write!(f, "published root is outdated by 1 local entry, using local root")
            }
            Self::RemoteLagging { behind } => write!(
                f,
                "published root is outdated by {behind} local entries, using local root"
            ),
            Self::RemoteNewer => write!(f, "published root is newer, recorded locally"),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use ucanfs_store::MemoryStorage;
    use ucanfs_ucan::content_id;

    use crate::memory::{MemoryDepot, RecordingUserMessages, UserMessage};

    use super::*;

    async fn log_with(cids: &[Cid]) -> anyhow::Result<CidLog<MemoryStorage>> {
        let mut log = CidLog::create(MemoryStorage::new(), "cid-log").await?;
        for cid in cids {
            log.add(*cid).await?;
        }
        Ok(log)
    }

    #[test_log::test(tokio::test)]
    async fn test_select_root_offline() -> anyhow::Result<()> {
        let (cid1, cid2) = (content_id("1"), content_id("2"));

        let mut empty = log_with(&[]).await?;
        assert!(matches!(
            select_root(&mut empty, Some(cid1), Connectivity::Offline).await,
            Err(ReferenceError::NoLocalRoot)
        ));

        let mut log = log_with(&[cid1, cid2]).await?;
        let selected = select_root(&mut log, Some(content_id("3")), Connectivity::Offline).await?;
        assert_eq!(
            selected,
            SelectedRoot {
                cid: Some(cid2),
                reason: RootReason::Offline
            }
        );
        assert_eq!(log.len(), 2);

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_select_root_without_remote_pointer() -> anyhow::Result<()> {
        let cid1 = content_id("1");

        let mut empty = log_with(&[]).await?;
        assert_eq!(
            select_root(&mut empty, None, Connectivity::Online).await?,
            SelectedRoot {
                cid: None,
                reason: RootReason::CreateNew
            }
        );

        let mut log = log_with(&[cid1]).await?;
        assert_eq!(
            select_root(&mut log, None, Connectivity::Online).await?,
            SelectedRoot {
                cid: Some(cid1),
                reason: RootReason::NoRemotePointer
            }
        );

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_select_root_against_remote_pointer() -> anyhow::Result<()> {
        let (cid1, cid2, cid3) = (content_id("1"), content_id("2"), content_id("3"));
        let mut log = log_with(&[cid1, cid2]).await?;

        let lagging = select_root(&mut log, Some(cid1), Connectivity::Online).await?;
        assert_eq!(
            lagging,
            SelectedRoot {
                cid: Some(cid2),
                reason: RootReason::RemoteLagging { behind: 1 }
            }
        );
        assert_eq!(log.all(), &[cid1, cid2]);

        let up_to_date = select_root(&mut log, Some(cid2), Connectivity::Online).await?;
        assert_eq!(
            up_to_date,
            SelectedRoot {
                cid: Some(cid2),
                reason: RootReason::RemoteUpToDate
            }
        );

        let newer = select_root(&mut log, Some(cid3), Connectivity::Online).await?;
        assert_eq!(
            newer,
            SelectedRoot {
                cid: Some(cid3),
                reason: RootReason::RemoteNewer
            }
        );
        assert_eq!(log.all(), &[cid1, cid2, cid3]);

        Ok(())
    }

    #[test_log::test(tokio::test)]
    async fn test_check_version() -> anyhow::Result<()> {
        let depot = MemoryDepot::new();
        let messages = RecordingUserMessages::new();
        let supported = SupportedVersions::default();

        let (current, unmarked, future, garbage) = (
            content_id("current"),
            content_id("unmarked"),
            content_id("future"),
            content_id("garbage"),
        );
        depot.set_version(&current, "2.0.0").await;
        depot.set_version(&future, "3.0.0").await;
        depot.set_version(&garbage, "two").await;

        assert_eq!(
            check_version(&depot, &messages, &supported, &current).await?,
            SemVer::new(2, 0, 0)
        );
        assert!(messages.messages().await.is_empty());

        assert!(matches!(
            check_version(&depot, &messages, &supported, &unmarked).await,
            Err(ReferenceError::VersionTooLow { .. })
        ));
        assert!(matches!(
            check_version(&depot, &messages, &supported, &future).await,
            Err(ReferenceError::VersionTooHigh { .. })
        ));
        assert!(matches!(
            check_version(&depot, &messages, &supported, &garbage).await,
            Err(ReferenceError::VersionTooHigh { .. })
        ));

        assert_eq!(
            messages.messages().await,
            vec![
                UserMessage::VersionTooLow("1.0.0".to_string()),
                UserMessage::VersionTooHigh("3.0.0".to_string()),
                UserMessage::VersionTooHigh("two".to_string()),
            ]
        );

        Ok(())
    }
}
