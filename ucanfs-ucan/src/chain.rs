use std::{
    collections::{HashMap, HashSet, VecDeque},
    time::SystemTime,
};

use libipld::Cid;
use ucanfs_did::{Did, KeyRegistry};

use crate::{
    Capability, FactMap, ProofReference, Ucan, UcanError, UcanResult, ValidationFailure,
};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The default ceiling on how many proof links are followed from a token.
pub const MAX_PROOF_DEPTH: usize = 64;

//--------------------------------------------------------------------------------------------------
// Traits
//--------------------------------------------------------------------------------------------------

/// A source of tokens addressable by content id.
pub trait UcanStore {
    /// Returns the token whose content id is `cid`.
    fn get_by_cid(&self, cid: &Cid) -> Option<Ucan>;
}

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Why a proof link could not be followed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncompleteReason {
    /// The store has no token with the referenced content id.
    NotFound,

    /// The inline proof is not a decodable token.
    Malformed(String),

    /// Following the link would exceed the depth ceiling.
    DepthLimit,
}

/// A proof link that was skipped while walking a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteProof {
    /// The reference that was skipped.
    pub reference: ProofReference,

    /// Why it was skipped.
    pub reason: IncompleteReason,
}

/// The capabilities gathered from a token and every proof reachable from it.
///
/// An empty `incomplete` list means every link resolved. Capabilities found in a chain with
/// skipped links are still listed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainCapabilities {
    /// Capabilities in walk order: the token's own first, then its proofs level by level.
    pub capabilities: Vec<Capability>,

    /// Links that could not be followed.
    pub incomplete: Vec<IncompleteProof>,
}

/// A token in a chain that failed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidToken {
    /// The token's content id.
    pub cid: Cid,

    /// The check it failed.
    pub failure: ValidationFailure,
}

/// A proof whose audience is not the issuer of the token that cites it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MisalignedProof {
    /// The proof's content id.
    pub cid: Cid,

    /// The issuer of the citing token.
    pub expected: Did,

    /// The proof's audience.
    pub found: Did,
}

/// A chain whose authority does not originate with the owner of the resource it is used on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignRoot {
    /// The owner the chain should be rooted at.
    pub expected: Did,

    /// The chain's root issuer, or `None` if its first-proof path loops.
    pub found: Option<Did>,
}

/// The outcome of validating every token reachable from a token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainValidation {
    /// Tokens that failed validation.
    pub invalid: Vec<InvalidToken>,

    /// Proofs not delegated to the token citing them.
    pub misaligned: Vec<MisalignedProof>,

    /// Links that could not be followed.
    pub incomplete: Vec<IncompleteProof>,

    /// Set when the chain was checked against an owner and is rooted elsewhere.
    pub foreign_root: Option<ForeignRoot>,
}

struct Visit {
    ucan: Ucan,
    depth: usize,
    delegator: Option<Did>,
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl ChainCapabilities {
    /// Returns `true` if every proof link was followed.
    pub fn is_complete(&self) -> bool {
        self.incomplete.is_empty()
    }
}

impl ChainValidation {
    /// Returns `true` if every token is valid, aligned and resolved, and the chain is rooted
    /// where it was expected to be.
    pub fn is_valid(&self) -> bool {
        self.invalid.is_empty()
            && self.misaligned.is_empty()
            && self.incomplete.is_empty()
            && self.foreign_root.is_none()
    }

    /// Returns `true` if something in the chain is wrong, as opposed to merely unresolved.
    pub fn is_rejected(&self) -> bool {
        !self.invalid.is_empty() || !self.misaligned.is_empty() || self.foreign_root.is_some()
    }
}

impl ProofReference {
    /// Resolves the referenced token, decoding inline proofs and looking others up in `store`.
    pub fn resolve<S>(&self, store: &S) -> Result<Ucan, IncompleteReason>
    where
        S: UcanStore + ?Sized,
    {
        match self {
            Self::Cid(cid) => store.get_by_cid(cid).ok_or(IncompleteReason::NotFound),
            Self::Inline(encoded) => {
                Ucan::decode(encoded).map_err(|e| IncompleteReason::Malformed(e.to_string()))
            }
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

/// Lists the capabilities of `ucan` followed by those of every proof reachable from it.
///
/// Unresolvable proofs are skipped and reported. Each token is visited at most once, so a cyclic
/// proof graph terminates.
pub fn list_capabilities<S>(store: &S, ucan: &Ucan, max_depth: usize) -> ChainCapabilities
where
    S: UcanStore + ?Sized,
{
    let mut capabilities = Vec::new();
    let incomplete = walk(store, ucan, max_depth, |visit| {
        capabilities.extend_from_slice(visit.ucan.attenuations());
    });

    ChainCapabilities {
        capabilities,
        incomplete,
    }
}

/// Merges the facts of `ucan` and every proof reachable from it.
///
/// On a key collision the token closer to `ucan` wins; `ucan`'s own facts beat any proof's. Between
/// tokens at the same depth the one reached first wins, and within one token the later record wins.
pub fn list_facts<S>(store: &S, ucan: &Ucan, max_depth: usize) -> FactMap
where
    S: UcanStore + ?Sized,
{
    // Tokens are visited in order of their shortest distance from `ucan`.
    let mut facts = FactMap::new();
    walk(store, ucan, max_depth, |visit| {
        for (key, value) in visit.ucan.facts().merged() {
            facts.entry(key).or_insert(value);
        }
    });

    facts
}

/// Validates `ucan` and every proof reachable from it at `now`.
///
/// Besides each token's own validity, every proof must be addressed to the issuer of the token
/// that cites it.
pub fn validate_chain<S>(
    store: &S,
    ucan: &Ucan,
    registry: &KeyRegistry,
    now: SystemTime,
    max_depth: usize,
) -> ChainValidation
where
    S: UcanStore + ?Sized,
{
    let mut invalid = Vec::new();
    let mut misaligned = Vec::new();

    let incomplete = walk(store, ucan, max_depth, |visit| {
        let cid = visit.ucan.cid();

        if let Err(failure) = visit.ucan.check_validity(registry, now) {
            tracing::debug!(%cid, %failure, "invalid token in chain");
            invalid.push(InvalidToken { cid, failure });
        }

        if let Some(delegator) = &visit.delegator {
            if visit.ucan.audience() != delegator {
                tracing::debug!(%cid, "proof audience does not match delegator");
                misaligned.push(MisalignedProof {
                    cid,
                    expected: delegator.clone(),
                    found: visit.ucan.audience().clone(),
                });
            }
        }
    });

    ChainValidation {
        invalid,
        misaligned,
        incomplete,
        foreign_root: None,
    }
}

/// Validates `ucan`'s chain like [`validate_chain`] and checks that its root issuer is `owner`.
///
/// A token only carries authority over `owner`'s resources if it was delegated, directly or
/// through its proofs, by `owner`. A root that cannot be reached because a proof is missing or the
/// chain is too deep is already reported as incomplete.
pub fn validate_delegation<S>(
    store: &S,
    ucan: &Ucan,
    owner: &Did,
    registry: &KeyRegistry,
    now: SystemTime,
    max_depth: usize,
) -> ChainValidation
where
    S: UcanStore + ?Sized,
{
    let mut validation = validate_chain(store, ucan, registry, now, max_depth);

    let found = match root_issuer(store, ucan, max_depth) {
        Ok(root) if root == *owner => return validation,
        Ok(root) => Some(root),
        Err(UcanError::ProofCycle(_)) => None,
        Err(e) => {
            tracing::debug!(cid = %ucan.cid(), %e, "root issuer not reached");
            return validation;
        }
    };

    tracing::debug!(cid = %ucan.cid(), %owner, ?found, "chain not rooted at owner");
    validation.foreign_root = Some(ForeignRoot {
        expected: owner.clone(),
        found,
    });

    validation
}

/// Resolves the issuer at the base of `ucan`'s chain by following only the first proof of each
/// token.
///
/// Unlike capability listing, a missing proof here is an error.
pub fn root_issuer<S>(store: &S, ucan: &Ucan, max_depth: usize) -> UcanResult<Did>
where
    S: UcanStore + ?Sized,
{
    let mut current = ucan.clone();
    let mut visited = HashSet::from([current.cid().to_string()]);
    let mut depth = 0;

    while let Some(reference) = current.proofs().first() {
        depth += 1;
        if depth > max_depth {
            return Err(UcanError::ProofChainTooDeep(max_depth));
        }

        let key = reference.content_id().to_string();
        if !visited.insert(key.clone()) {
            return Err(UcanError::ProofCycle(key));
        }

        current = match reference {
            ProofReference::Cid(cid) => store
                .get_by_cid(cid)
                .ok_or_else(|| UcanError::MissingProof(key))?,
            ProofReference::Inline(encoded) => Ucan::decode(encoded)?,
        };
    }

    Ok(current.issuer().clone())
}

/// Walks `root` and its proofs breadth first, calling `visit` once per distinct token at its
/// shortest depth.
fn walk<S>(
    store: &S,
    root: &Ucan,
    max_depth: usize,
    mut visit: impl FnMut(&Visit),
) -> Vec<IncompleteProof>
where
    S: UcanStore + ?Sized,
{
    let mut incomplete = Vec::new();
    let mut visited = HashSet::from([root.cid().to_string()]);
    let mut queue = VecDeque::from([Visit {
        ucan: root.clone(),
        depth: 0,
        delegator: None,
    }]);

    while let Some(current) = queue.pop_front() {
        visit(&current);

        for reference in current.ucan.proofs().iter() {
            let key = reference.content_id().to_string();
            if visited.contains(&key) {
                tracing::trace!(%key, "proof already visited");
                continue;
            }

            if current.depth >= max_depth {
                tracing::warn!(%key, max_depth, "proof chain truncated at depth limit");
                incomplete.push(IncompleteProof {
                    reference: reference.clone(),
                    reason: IncompleteReason::DepthLimit,
                });
                continue;
            }

            visited.insert(key.clone());

            let ucan = match reference.resolve(store) {
                Ok(ucan) => ucan,
                Err(reason) => {
                    tracing::debug!(%key, ?reason, "skipping unresolved proof");
                    incomplete.push(IncompleteProof {
                        reference: reference.clone(),
                        reason,
                    });
                    continue;
                }
            };

            // A store may hand back a token under a key other than its own content id.
            let actual = ucan.cid().to_string();
            if actual != key && !visited.insert(actual) {
                continue;
            }

            queue.push_back(Visit {
                ucan,
                depth: current.depth + 1,
                delegator: Some(current.ucan.issuer().clone()),
            });
        }
    }

    incomplete
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl UcanStore for HashMap<String, Ucan> {
    fn get_by_cid(&self, cid: &Cid) -> Option<Ucan> {
        self.get(&cid.to_string()).cloned()
    }
}

impl UcanStore for [Ucan] {
    fn get_by_cid(&self, cid: &Cid) -> Option<Ucan> {
        let cid = cid.to_string();
        self.iter().find(|ucan| ucan.cid().to_string() == cid).cloned()
    }
}

impl UcanStore for Vec<Ucan> {
    fn get_by_cid(&self, cid: &Cid) -> Option<Ucan> {
        self.as_slice().get_by_cid(cid)
    }
}

impl<S> UcanStore for &S
where
    S: UcanStore + ?Sized,
{
    fn get_by_cid(&self, cid: &Cid) -> Option<Ucan> {
        (**self).get_by_cid(cid)
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
