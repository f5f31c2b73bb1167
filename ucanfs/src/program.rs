use std::time::SystemTime;

use libipld::Cid;
use ucanfs_config::{Config, MainConfig};
use ucanfs_did::Did;
use ucanfs_key::{GetKeyType, JwsAlgName, PublicKeyBytes, Sign};
use ucanfs_reference::{
    check_version, select_root, CidLog, Connectivity, SelectedRoot, SupportedVersions,
};
use ucanfs_store::Storage;
use ucanfs_ucan::{
    account_ability, validate_delegation, Ability, ChainValidation, Query, Ucan, UcanBuilder,
    UcanRepository, ACCOUNT_SCHEME, FS_SCHEME,
};

use crate::{Components, ProgramError, ProgramResult};

//--------------------------------------------------------------------------------------------------
// Macros
//--------------------------------------------------------------------------------------------------

/// Logs at `info` when the program runs in debug mode, at `debug` otherwise.
macro_rules! note {
    ($debug:expr, $($arg:tt)+) => {
        if $debug {
            tracing::info!($($arg)+)
        } else {
            tracing::debug!($($arg)+)
        }
    };
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// An assembled program: the agent's tokens and data root history plus the components it was
/// built from.
///
/// The program is an explicit handle. Nothing it holds is global, and [`teardown`][Self::teardown]
/// hands the components back.
pub struct Program<St, K> {
    config: Config,
    components: Components<St, K>,
    agent_did: Did,
    ucans: UcanRepository<St>,
    cid_log: CidLog<St>,
    supported_versions: SupportedVersions,
}

/// The outcome of asking whether an operation is authorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// A token grants the operation and its whole chain is valid.
    Granted(Ucan),

    /// No held token grants the operation.
    NotFound,

    /// A token grants the operation, but some of its proofs could not be resolved.
    Incomplete {
        /// The granting token.
        ucan: Ucan,

        /// What was checked.
        validation: ChainValidation,
    },

    /// A token grants the operation, but a token in its chain is invalid or misdelegated, or the
    /// chain does not originate with the resource owner.
    Rejected {
        /// The granting token.
        ucan: Ucan,

        /// What was checked.
        validation: ChainValidation,
    },
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl<St, K> Program<St, K>
where
    St: Storage,
    K: Sign + JwsAlgName + PublicKeyBytes + GetKeyType,
{
    /// Validates `config` and loads the token repository and data root log from storage.
    pub async fn assemble(config: Config, components: Components<St, K>) -> ProgramResult<Self> {
        config.validate()?;

        let keys = config.storage_keys();
        let supported_versions = config.supported_versions()?;
        let agent_did = Did::from_key(&components.agent)?;

        let ucans = UcanRepository::create(components.storage.clone(), keys.ucans)
            .await?
            .with_max_proof_depth(config.ucan.max_proof_depth);
        let cid_log = CidLog::create(components.storage.clone(), keys.cid_log).await?;

        note!(
            config.debug,
            agent = %agent_did,
            namespace = %config.namespace,
            ucans = ucans.len(),
            roots = cid_log.len(),
            key_types = ?components.registry.tags().collect::<Vec<_>>(),
            "assembled program"
        );

        Ok(Self {
            config,
            components,
            agent_did,
            ucans,
            cid_log,
            supported_versions,
        })
    }

    /// Releases the program, returning its components.
    pub fn teardown(self) -> Components<St, K> {
        note!(self.config.debug, agent = %self.agent_did, "tore down program");
        self.components
    }

    /// Returns the configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the components.
    pub fn components(&self) -> &Components<St, K> {
        &self.components
    }

    /// Returns the DID of the agent's key.
    pub fn agent_did(&self) -> &Did {
        &self.agent_did
    }

    /// Returns the held tokens.
    pub fn ucans(&self) -> &UcanRepository<St> {
        &self.ucans
    }

    /// Returns the data root history.
    pub fn cid_log(&self) -> &CidLog<St> {
        &self.cid_log
    }

    /// Returns a token builder using the configured default lifetime.
    pub fn ucan_builder(&self) -> UcanBuilder {
        Ucan::builder().lifetime(self.config.default_lifetime())
    }

    /// Signs a token as the agent.
    pub fn sign(&self, builder: UcanBuilder<Did>) -> ProgramResult<Ucan> {
        Ok(builder.sign(&self.components.agent)?)
    }

    /// Checks a single token's time bounds, algorithm and signature.
    pub fn is_valid(&self, ucan: &Ucan) -> bool {
        ucan.is_valid(&self.components.registry)
    }

    /// Adds tokens to the repository.
    pub async fn add_ucans(&mut self, ucans: impl IntoIterator<Item = Ucan>) -> ProgramResult<()> {
        self.ucans.add(ucans).await?;
        Ok(())
    }

    /// Finds a held token granting `ability` on the path `segments` of `did`'s resources.
    ///
    /// See [`UcanRepository::lookup_capability`] for how a token is chosen.
    pub fn lookup_capability<T>(
        &self,
        did: &Did,
        scheme: &str,
        segments: &[T],
        ability: &Ability,
    ) -> Option<&Ucan>
    where
        T: AsRef<str>,
    {
        self.ucans.lookup_capability(did, scheme, segments, ability)
    }

    /// Finds a token granting `ability` on `did`'s resources and validates its chain at `now`.
    ///
    /// The chain must be rooted at `did`; a token issued by anyone else is rejected.
    pub fn authorize<T>(
        &self,
        did: &Did,
        scheme: &str,
        segments: &[T],
        ability: &Ability,
        now: SystemTime,
    ) -> Authorization
    where
        T: AsRef<str>,
    {
        let Some(ucan) = self.lookup_capability(did, scheme, segments, ability) else {
            return Authorization::NotFound;
        };

        let validation = validate_delegation(
            &self.ucans,
            ucan,
            did,
            &self.components.registry,
            now,
            self.config.ucan.max_proof_depth,
        );

        let ucan = ucan.clone();
        if validation.is_valid() {
            Authorization::Granted(ucan)
        } else if validation.is_rejected() {
            Authorization::Rejected { ucan, validation }
        } else {
            Authorization::Incomplete { ucan, validation }
        }
    }

    /// Finds a held token answering an access query about `owner`'s resources.
    pub fn answer_query(&self, owner: &Did, query: &Query) -> ProgramResult<Option<&Ucan>> {
        let found = match query {
            Query::Account => {
                self.lookup_capability::<&str>(owner, ACCOUNT_SCHEME, &[], &account_ability())
            }
            Query::FileSystem(query) => {
                let segments = query.path_segments();
                self.lookup_capability(owner, FS_SCHEME, segments.as_slice(), &query.ability()?)
            }
        };

        Ok(found)
    }

    /// Resolves the root issuer of `ucan` against the held tokens.
    pub fn root_issuer(&self, ucan: &Ucan) -> ProgramResult<Did> {
        Ok(self.ucans.root_issuer(ucan)?)
    }

    /// Chooses the authoritative data root and checks its file system version.
    ///
    /// When online the published root is looked up first. A published root the log has not seen
    /// is appended to it.
    pub async fn load_data_root(
        &mut self,
        connectivity: Connectivity,
    ) -> ProgramResult<SelectedRoot> {
        let remote = match connectivity {
            Connectivity::Online => {
                let properties = self.components.account.properties();
                self.components.data_root.lookup(&properties).await?
            }
            Connectivity::Offline => None,
        };

        let selected = select_root(&mut self.cid_log, remote, connectivity).await?;
        note!(
            self.config.debug,
            cid = ?selected.cid.map(|cid| cid.to_string()),
            reason = %selected.reason,
            "loading data root"
        );

        if let Some(cid) = &selected.cid {
            check_version(
                self.components.depot.as_ref(),
                self.components.user_messages.as_ref(),
                &self.supported_versions,
                cid,
            )
            .await?;
        }

        Ok(selected)
    }

    /// Publishes `cid` as the data root and records it locally.
    ///
    /// The tokens addressed to the agent, with their chains, must satisfy the account.
    pub async fn update_data_root(&mut self, cid: Cid) -> ProgramResult<()> {
        let proofs: Vec<Ucan> = self
            .ucans
            .audience_tokens(&self.agent_did)
            .into_iter()
            .cloned()
            .collect();

        let capabilities: Vec<_> = proofs
            .iter()
            .flat_map(|ucan| self.ucans.list_capabilities(ucan).capabilities)
            .collect();

        if !self
            .components
            .account
            .can_update_data_root(&capabilities)
            .await
        {
            return Err(ProgramError::NotAuthorized(format!(
                "{} cannot update the data root",
                self.agent_did
            )));
        }

        self.components
            .account
            .update_data_root(&cid, &proofs)
            .await?;
        self.cid_log.add(cid).await?;

        note!(self.config.debug, %cid, "updated data root");

        Ok(())
    }

    /// Returns the DNSLink target of `domain`.
    pub async fn lookup_dns_link(&self, domain: &str) -> ProgramResult<Option<String>> {
        Ok(self.components.dns.lookup_dns_link(domain).await?)
    }
}

impl Authorization {
    /// Returns `true` if the operation is granted.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    /// Returns the token that was found, whether or not its chain checked out.
    pub fn ucan(&self) -> Option<&Ucan> {
        match self {
            Self::Granted(ucan)
            | Self::Incomplete { ucan, .. }
            | Self::Rejected { ucan, .. } => Some(ucan),
            Self::NotFound => None,
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
