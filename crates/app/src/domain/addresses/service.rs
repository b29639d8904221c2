//! Addresses service.

use async_trait::async_trait;
use mockall::automock;
use storefront::delivery::Pincode;
use tracing::info;

use crate::{
    database::Db,
    domain::{
        addresses::{
            data::NewAddress,
            errors::AddressesServiceError,
            records::{AddressRecord, AddressUuid},
            repository::PgAddressesRepository,
        },
        customers::UserUuid,
    },
};

#[derive(Debug, Clone)]
pub struct PgAddressesService {
    db: Db,
    repository: PgAddressesRepository,
}

impl PgAddressesService {
    #[must_use]
    pub fn new(db: Db) -> Self {
        Self {
            db,
            repository: PgAddressesRepository::new(),
        }
    }
}

fn required(value: &str, field: &'static str) -> Result<String, AddressesServiceError> {
    let trimmed = value.trim();

    if trimmed.is_empty() {
        return Err(AddressesServiceError::MissingField(field));
    }

    Ok(trimmed.to_owned())
}

#[async_trait]
impl AddressesService for PgAddressesService {
    #[tracing::instrument(
        name = "addresses.service.create_address",
        skip(self, address),
        fields(user_uuid = %user, address_uuid = tracing::field::Empty),
        err
    )]
    async fn create_address(
        &self,
        user: UserUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, AddressesServiceError> {
        let data = NewAddress {
            title: required(&address.title, "title")?,
            full_address: required(&address.full_address, "full address")?,
            landmark: address
                .landmark
                .map(|landmark| landmark.trim().to_owned())
                .filter(|landmark| !landmark.is_empty()),
            pincode: Pincode::parse(&address.pincode)?.into(),
            phone: required(&address.phone, "phone")?,
            is_default: address.is_default,
        };

        let uuid = AddressUuid::new();

        tracing::Span::current().record("address_uuid", tracing::field::display(uuid));

        let mut tx = self.db.begin_transaction().await?;

        let existing = self.repository.lock_addresses(&mut tx, user).await?;
        let is_default = data.is_default || existing == 0;

        if is_default {
            self.repository.clear_default(&mut tx, user).await?;
        }

        let created = self
            .repository
            .create_address(&mut tx, user, uuid, &data, is_default)
            .await?;

        tx.commit().await?;

        info!(address_uuid = %created.uuid, is_default, "created address");

        Ok(created)
    }

    async fn list_addresses(
        &self,
        user: UserUuid,
    ) -> Result<Vec<AddressRecord>, AddressesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let addresses = self.repository.list_addresses(&mut tx, user).await?;

        tx.commit().await?;

        Ok(addresses)
    }

    async fn get_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<AddressRecord, AddressesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let address = self.repository.get_address(&mut tx, user, address).await?;

        tx.commit().await?;

        Ok(address)
    }

    #[tracing::instrument(
        name = "addresses.service.set_default_address",
        skip(self),
        fields(user_uuid = %user, address_uuid = %address),
        err
    )]
    async fn set_default_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<AddressRecord, AddressesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        self.repository.lock_addresses(&mut tx, user).await?;
        self.repository.get_address(&mut tx, user, address).await?;
        self.repository.clear_default(&mut tx, user).await?;

        let updated = self.repository.set_default(&mut tx, user, address).await?;

        tx.commit().await?;

        info!("set default address");

        Ok(updated)
    }

    async fn delete_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<(), AddressesServiceError> {
        let mut tx = self.db.begin_transaction().await?;

        let rows_affected = self
            .repository
            .delete_address(&mut tx, user, address)
            .await?;

        if rows_affected == 0 {
            return Err(AddressesServiceError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }
}

#[automock]
#[async_trait]
pub trait AddressesService: Send + Sync {
    /// Saves a new address. The first address of a customer becomes the default.
    async fn create_address(
        &self,
        user: UserUuid,
        address: NewAddress,
    ) -> Result<AddressRecord, AddressesServiceError>;

    /// Lists a customer's addresses, default first.
    async fn list_addresses(
        &self,
        user: UserUuid,
    ) -> Result<Vec<AddressRecord>, AddressesServiceError>;

    /// Retrieve a single address owned by the customer.
    async fn get_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<AddressRecord, AddressesServiceError>;

    /// Makes an address the customer's only default.
    async fn set_default_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<AddressRecord, AddressesServiceError>;

    /// Deletes an address owned by the customer.
    async fn delete_address(
        &self,
        user: UserUuid,
        address: AddressUuid,
    ) -> Result<(), AddressesServiceError>;
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use crate::{
        domain::errors::ErrorKind,
        test::{TestContext, helpers},
    };

    use super::*;

    #[tokio::test]
    async fn first_address_becomes_default() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        let address = helpers::create_address(&ctx, user, "175001").await?;

        assert!(address.is_default);
        assert_eq!(address.user_uuid, user);

        Ok(())
    }

    #[tokio::test]
    async fn create_address_normalizes_pincode() -> TestResult {
        let ctx = TestContext::new().await;

        let address = helpers::create_address(&ctx, UserUuid::new(), " 175001 ").await?;

        assert_eq!(address.pincode, "175001");

        Ok(())
    }

    #[tokio::test]
    async fn create_address_rejects_bad_pincode() {
        let ctx = TestContext::new().await;

        let result = helpers::create_address(&ctx, UserUuid::new(), "1750").await;

        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(ErrorKind::InvalidArgument)
        );
    }

    #[tokio::test]
    async fn create_address_requires_phone() {
        let ctx = TestContext::new().await;

        let result = ctx
            .addresses
            .create_address(
                UserUuid::new(),
                NewAddress {
                    phone: "  ".to_string(),
                    ..helpers::new_address("175001")
                },
            )
            .await;

        assert!(
            matches!(result, Err(AddressesServiceError::MissingField("phone"))),
            "expected MissingField, got {result:?}"
        );
    }

    #[tokio::test]
    async fn new_default_address_replaces_previous_default() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        let first = helpers::create_address(&ctx, user, "175001").await?;

        let second = ctx
            .addresses
            .create_address(
                user,
                NewAddress {
                    is_default: true,
                    ..helpers::new_address("175002")
                },
            )
            .await?;

        let addresses = ctx.addresses.list_addresses(user).await?;
        let defaults: Vec<AddressUuid> = addresses
            .iter()
            .filter(|address| address.is_default)
            .map(|address| address.uuid)
            .collect();

        assert_eq!(defaults, vec![second.uuid]);
        assert!(addresses.iter().any(|address| address.uuid == first.uuid));

        Ok(())
    }

    #[tokio::test]
    async fn set_default_address_moves_default() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        let first = helpers::create_address(&ctx, user, "175001").await?;
        let second = helpers::create_address(&ctx, user, "175002").await?;

        assert!(!second.is_default);

        let updated = ctx.addresses.set_default_address(user, second.uuid).await?;

        assert!(updated.is_default);
        assert!(!ctx.addresses.get_address(user, first.uuid).await?.is_default);

        Ok(())
    }

    #[tokio::test]
    async fn concurrent_set_default_leaves_single_default() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();
        let mut uuids = Vec::new();

        for pincode in ["175001", "175002", "175003", "175004"] {
            uuids.push(helpers::create_address(&ctx, user, pincode).await?.uuid);
        }

        let mut tasks = tokio::task::JoinSet::new();

        for uuid in uuids {
            let addresses = ctx.addresses.clone();
            tasks.spawn(async move { addresses.set_default_address(user, uuid).await });
        }

        while let Some(result) = tasks.join_next().await {
            result??;
        }

        let defaults = ctx
            .addresses
            .list_addresses(user)
            .await?
            .into_iter()
            .filter(|address| address.is_default)
            .count();

        assert_eq!(defaults, 1);

        Ok(())
    }

    #[tokio::test]
    async fn get_address_of_other_customer_returns_not_found() -> TestResult {
        let ctx = TestContext::new().await;

        let address = helpers::create_address(&ctx, UserUuid::new(), "175001").await?;

        let result = ctx
            .addresses
            .get_address(UserUuid::new(), address.uuid)
            .await;

        assert!(
            matches!(result, Err(AddressesServiceError::NotFound)),
            "expected NotFound, got {result:?}"
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_address_makes_it_not_found() -> TestResult {
        let ctx = TestContext::new().await;
        let user = UserUuid::new();

        let address = helpers::create_address(&ctx, user, "175001").await?;

        ctx.addresses.delete_address(user, address.uuid).await?;

        let result = ctx.addresses.delete_address(user, address.uuid).await;

        assert!(
            matches!(result, Err(AddressesServiceError::NotFound)),
            "expected NotFound after deletion, got {result:?}"
        );

        Ok(())
    }
}
