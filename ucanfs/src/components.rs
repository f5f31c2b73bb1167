use typed_builder::TypedBuilder;
use ucanfs_did::KeyRegistry;
use ucanfs_reference::{Account, DataRoot, Depot, Dns, TracingUserMessages, UserMessages};

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Everything a [`Program`][crate::Program] is assembled from, besides its configuration.
///
/// `St` is the storage the token repository and data root log persist to. `K` is the agent's key
/// pair, which signs the tokens the agent issues.
#[derive(TypedBuilder)]
pub struct Components<St, K> {
    /// The persisted key-value storage.
    pub storage: St,

    /// The agent's key pair.
    pub agent: K,

    /// The key types accepted for token issuers.
    #[builder(default)]
    pub registry: KeyRegistry,

    /// The account the data root is published through.
    pub account: Box<dyn Account>,

    /// Resolves the published data root.
    pub data_root: Box<dyn DataRoot>,

    /// Reads file system version markers.
    pub depot: Box<dyn Depot>,

    /// DNS lookups.
    pub dns: Box<dyn Dns>,

    /// Tells the user about version mismatches.
    #[builder(default = Box::new(TracingUserMessages))]
    pub user_messages: Box<dyn UserMessages>,
}
