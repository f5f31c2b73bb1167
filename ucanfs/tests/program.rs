use std::time::{Duration, SystemTime};

use ucanfs::{
    config::Config,
    did::Did,
    key::{Ed25519KeyPair, KeyPairGenerate, RsaKeyPair},
    reference::{
        memory::{
            MemoryAccount, MemoryDataRoot, MemoryDepot, MemoryDns, RecordingUserMessages,
            UserMessage,
        },
        Connectivity, ReferenceError, RootReason,
    },
    store::MemoryStorage,
    ucan::{caps, content_id, Ability, FileSystemQuery, ForeignRoot, Query, Ucan, FS_SCHEME},
    Authorization, Components, Program, ProgramError,
};

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[test_log::test(tokio::test)]
async fn test_program_full_flow() -> anyhow::Result<()> {
    let mut rng = rand::thread_rng();

    // Alice owns the account and file system; the agent is one of her devices.
    let alice_key = Ed25519KeyPair::generate(&mut rng)?;
    let alice = Did::from_key(&alice_key)?;
    let agent_key = RsaKeyPair::generate_with_bits(&mut rng, 1024)?;
    let agent = Did::from_key(&agent_key)?;

    let storage = MemoryStorage::new();
    let data_root = MemoryDataRoot::new();
    let depot = MemoryDepot::new();
    let dns = MemoryDns::new();
    let messages = RecordingUserMessages::new();

    let components = Components::builder()
        .storage(storage.clone())
        .agent(agent_key)
        .account(Box::new(MemoryAccount::new(alice.clone(), data_root.clone())))
        .data_root(Box::new(data_root.clone()))
        .depot(Box::new(depot.clone()))
        .dns(Box::new(dns.clone()))
        .user_messages(Box::new(messages.clone()))
        .build();

    let mut program = Program::assemble(Config::default(), components).await?;
    assert_eq!(program.agent_did(), &agent);

    // Authority starts with Alice and is delegated to the agent.
    let root = Ucan::builder()
        .audience(alice.clone())
        .capabilities(caps! {
            format!("wnfs://{alice}/public") => ["*"],
            format!("account://{alice}") => ["account/*"],
        }?)
        .lifetime(Duration::from_secs(600))
        .sign(&alice_key)?;
    let delegation = Ucan::builder()
        .audience(agent.clone())
        .capabilities(caps! {
            format!("wnfs://{alice}/public") => ["fs/overwrite"],
            format!("account://{alice}") => ["account/*"],
        }?)
        .proofs([root.cid()])
        .lifetime(Duration::from_secs(600))
        .sign(&alice_key)?;

    assert!(program.is_valid(&root));
    assert!(program.is_valid(&delegation));

    program.add_ucans([delegation.clone(), root.clone()]).await?;
    assert_eq!(program.root_issuer(&delegation)?, alice);

    // Both tokens address the same level; the one added first wins.
    let path = ["public", "notes.md"];
    let append = Ability::fs("append")?;
    assert_eq!(
        program.lookup_capability(&alice, FS_SCHEME, &path, &append),
        Some(&delegation)
    );
    assert_eq!(
        program.authorize(&alice, FS_SCHEME, &path, &append, SystemTime::now()),
        Authorization::Granted(delegation.clone())
    );

    let expired = program.authorize(
        &alice,
        FS_SCHEME,
        &path,
        &append,
        SystemTime::now() + Duration::from_secs(3600),
    );
    assert!(matches!(expired, Authorization::Rejected { .. }));
    assert!(!expired.is_granted());

    let stranger = Did::from_key(&Ed25519KeyPair::generate(&mut rng)?)?;
    assert_eq!(
        program.authorize(&stranger, FS_SCHEME, &path, &append, SystemTime::now()),
        Authorization::NotFound
    );

    // Access queries.
    let read_notes = Query::FileSystem(FileSystemQuery::new("read", "public/notes.md")?);
    assert_eq!(program.answer_query(&alice, &read_notes)?, Some(&delegation));
    assert_eq!(program.answer_query(&alice, &Query::Account)?, Some(&delegation));
    assert_eq!(program.answer_query(&stranger, &Query::Account)?, None);

    // Publishing a new data root.
    let (cid1, cid2, cid3) = (content_id("1"), content_id("2"), content_id("3"));
    depot.set_version(&cid1, "2.0.0").await;
    depot.set_version(&cid2, "2.0.0").await;
    depot.set_version(&cid3, "3.0.0").await;

    program.update_data_root(cid1).await?;
    assert_eq!(data_root.get().await, Some(cid1));
    assert_eq!(program.cid_log().newest(), Some(&cid1));

    // Reconciling against the published pointer.
    let selected = program.load_data_root(Connectivity::Online).await?;
    assert_eq!(selected.cid, Some(cid1));
    assert_eq!(selected.reason, RootReason::RemoteUpToDate);

    data_root.set(cid2).await;
    let selected = program.load_data_root(Connectivity::Online).await?;
    assert_eq!(selected.cid, Some(cid2));
    assert_eq!(selected.reason, RootReason::RemoteNewer);
    assert_eq!(program.cid_log().all(), &[cid1, cid2]);

    let selected = program.load_data_root(Connectivity::Offline).await?;
    assert_eq!(selected.reason, RootReason::Offline);
    assert_eq!(selected.cid, Some(cid2));

    data_root.set(cid3).await;
    let result = program.load_data_root(Connectivity::Online).await;
    assert!(matches!(
        result,
        Err(ProgramError::ReferenceError(ReferenceError::VersionTooHigh { .. }))
    ));
    assert_eq!(
        messages.messages().await,
        vec![UserMessage::VersionTooHigh("3.0.0".to_string())]
    );

    // DNS passthrough.
    dns.set_dns_link("alice.example.com", format!("/ipfs/{cid2}")).await;
    assert_eq!(
        program.lookup_dns_link("alice.example.com").await?,
        Some(format!("/ipfs/{cid2}"))
    );

    // State survives reassembly from the same storage.
    let components = program.teardown();
    let program = Program::assemble(Config::default(), components).await?;
    assert_eq!(program.ucans().len(), 2);
    assert_eq!(program.cid_log().all(), &[cid1, cid2, cid3]);
    assert_eq!(program.ucans().audience_tokens(&agent), vec![&delegation]);

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_program_authorize_reports_incomplete_chain() -> anyhow::Result<()> {
    let mut rng = rand::thread_rng();
    let alice_key = Ed25519KeyPair::generate(&mut rng)?;
    let alice = Did::from_key(&alice_key)?;
    let agent_key = Ed25519KeyPair::generate(&mut rng)?;
    let agent = Did::from_key(&agent_key)?;

    let components = Components::builder()
        .storage(MemoryStorage::new())
        .agent(agent_key)
        .account(Box::new(MemoryAccount::new(alice.clone(), MemoryDataRoot::new())))
        .data_root(Box::new(MemoryDataRoot::new()))
        .depot(Box::new(MemoryDepot::new()))
        .dns(Box::new(MemoryDns::new()))
        .build();
    let mut program = Program::assemble(Config::default(), components).await?;

    // The proof this delegation cites was never added.
    let delegation = Ucan::builder()
        .audience(agent)
        .capabilities(caps! { format!("wnfs://{alice}/private") => ["fs/read"] }?)
        .proofs([content_id("never stored")])
        .sign(&alice_key)?;
    program.add_ucans([delegation.clone()]).await?;

    let authorization = program.authorize(
        &alice,
        FS_SCHEME,
        &["private", "diary.md"],
        &Ability::fs("read")?,
        SystemTime::now(),
    );

    let Authorization::Incomplete { ucan, validation } = &authorization else {
        anyhow::bail!("expected an incomplete chain, got {authorization:?}");
    };
    assert_eq!(ucan, &delegation);
    assert_eq!(validation.incomplete.len(), 1);
    assert!(matches!(
        program.root_issuer(&delegation),
        Err(ProgramError::UcanError(_))
    ));

    // Offline with nothing recorded cannot proceed.
    assert!(matches!(
        program.load_data_root(Connectivity::Offline).await,
        Err(ProgramError::ReferenceError(ReferenceError::NoLocalRoot))
    ));

    Ok(())
}

#[test_log::test(tokio::test)]
async fn test_program_authorize_rejects_authority_not_rooted_at_owner() -> anyhow::Result<()> {
    let mut rng = rand::thread_rng();
    let alice = Did::from_key(&Ed25519KeyPair::generate(&mut rng)?)?;
    let mallory_key = Ed25519KeyPair::generate(&mut rng)?;
    let mallory = Did::from_key(&mallory_key)?;
    let agent_key = Ed25519KeyPair::generate(&mut rng)?;
    let agent = Did::from_key(&agent_key)?;

    let components = Components::builder()
        .storage(MemoryStorage::new())
        .agent(agent_key)
        .account(Box::new(MemoryAccount::new(alice.clone(), MemoryDataRoot::new())))
        .data_root(Box::new(MemoryDataRoot::new()))
        .depot(Box::new(MemoryDepot::new()))
        .dns(Box::new(MemoryDns::new()))
        .build();
    let mut program = Program::assemble(Config::default(), components).await?;

    // Mallory claims everything under Alice's file system and hands it to the agent.
    let forged = Ucan::builder()
        .audience(agent)
        .capabilities(caps! { format!("wnfs://{alice}/*") => ["*"] }?)
        .sign(&mallory_key)?;
    assert!(program.is_valid(&forged));
    program.add_ucans([forged.clone()]).await?;

    let path = ["private", "diary.md"];
    let overwrite = Ability::fs("overwrite")?;
    assert_eq!(
        program.lookup_capability(&alice, FS_SCHEME, &path, &overwrite),
        Some(&forged)
    );

    let authorization = program.authorize(&alice, FS_SCHEME, &path, &overwrite, SystemTime::now());
    assert!(!authorization.is_granted());

    let Authorization::Rejected { ucan, validation } = &authorization else {
        anyhow::bail!("expected a rejected chain, got {authorization:?}");
    };
    assert_eq!(ucan, &forged);
    assert!(validation.invalid.is_empty());
    assert!(validation.misaligned.is_empty());
    assert_eq!(
        validation.foreign_root,
        Some(ForeignRoot {
            expected: alice,
            found: Some(mallory),
        })
    );

    Ok(())
}
