//--------------------------------------------------------------------------------------------------
// Macros
//--------------------------------------------------------------------------------------------------

/// A macro for defining a list of capabilities.
///
/// Evaluates to `UcanResult<Vec<Capability>>`.
///
/// ```
/// use ucanfs_ucan::caps;
///
/// let did = "did:key:z6MkiTBz1ymuepAQ4HEHYSF1H8quG5GLVVQR3djdX3mDooWp";
/// let capabilities = caps! {
///     format!("wnfs://{did}/public/docs") => ["fs/read", "fs/append"],
///     format!("wnfs://{did}/*") => ["*"],
/// }
/// .unwrap();
///
/// assert_eq!(capabilities.len(), 3);
/// ```
#[macro_export]
macro_rules! caps {
    { $( $resource:expr => [ $( $ability:expr ),+ $(,)? ] ),* $(,)? } => {
        (|| -> $crate::UcanResult<std::vec::Vec<$crate::Capability>> {
            #[allow(unused_mut)]
            let mut capabilities = std::vec::Vec::new();
            $(
                $(
                    capabilities.push($crate::Capability::parse(&$resource, $ability)?);
                )+
            )*
            ::std::result::Result::Ok(capabilities)
        })()
    };
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::{Ability, UcanError};

    #[test]
    fn test_caps_macro() -> anyhow::Result<()> {
        let capabilities = caps! {
            "wnfs://did:key:zAlice/public" => ["fs/read", "fs/overwrite"],
            "account://did:key:zAlice" => ["*"],
        }?;

        assert_eq!(capabilities.len(), 3);
        assert_eq!(capabilities[1].ability, Ability::fs("overwrite")?);
        assert_eq!(capabilities[2].ability, Ability::Superuser);

        let empty = caps! {}?;
        assert!(empty.is_empty());

        let invalid = caps! { "wnfs://did:key:zAlice" => ["fs"] };
        assert!(matches!(invalid, Err(UcanError::InvalidAbility(_))));

        Ok(())
    }
}
