use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

pub use error::EngineError;
pub use goods::{
    AUTO_CREATED_DESCRIPTION, AUTO_CREATED_VALUE, AUTO_CREATED_WEIGHT, Good, Material,
};
pub use hunters::{Hunter, Race, UNKNOWN_LOCATION};
pub use merchants::{Merchant, MerchantKind};
use sea_orm::{
    ActiveValue, QueryFilter, QueryOrder, sea_query::Expr, prelude::*,
};
pub use transactions::{Counterparty, CounterpartyRole, Direction, Transaction};
pub use lines::Line;

mod error;
mod goods;
mod hunters;
mod lines;
mod merchants;
mod transactions;
mod validation;

type ResultEngine<T> = Result<T, EngineError>;

/// Add one line's worth of value to a running total, refusing to wrap on
/// extreme client-supplied quantities.
fn accumulate_value(total: i64, unit_value: i64, quantity: i64) -> ResultEngine<i64> {
    unit_value
        .checked_mul(quantity)
        .and_then(|line_value| total.checked_add(line_value))
        .ok_or_else(|| EngineError::Validation("total value overflow".to_string()))
}

/// One requested goods line, as it arrives from a client: the good is named,
/// not referenced by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineRequest {
    pub name: String,
    pub quantity: i64,
}

/// A goods line successfully matched to a good and applied to its stock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedLine {
    pub good_id: Uuid,
    pub quantity: i64,
}

/// Outcome of the goods line resolver.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedLines {
    pub lines: Vec<ResolvedLine>,
    pub total_value: i64,
}

/// Optional filters for listing goods.
#[derive(Clone, Debug, Default)]
pub struct GoodFilter {
    pub name: Option<String>,
    pub description: Option<String>,
    pub material: Option<Material>,
}

/// Whitelisted fields a good update may touch.
#[derive(Clone, Debug, Default)]
pub struct GoodChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub material: Option<Material>,
    pub weight: Option<f64>,
    pub stock: Option<i64>,
    pub value: Option<i64>,
}

/// Whitelisted fields a hunter update may touch.
#[derive(Clone, Debug, Default)]
pub struct HunterChanges {
    pub name: Option<String>,
    pub race: Option<Race>,
    pub location: Option<String>,
}

/// Whitelisted fields a merchant update may touch.
#[derive(Clone, Debug, Default)]
pub struct MerchantChanges {
    pub name: Option<String>,
    pub kind: Option<MerchantKind>,
    pub location: Option<String>,
}

/// Optional filters for listing transactions.
#[derive(Clone, Debug, Default)]
pub struct TransactionFilter {
    pub involved_name: Option<String>,
    pub direction: Option<Direction>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    guarded_stock: bool,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    async fn good_model_by_name(&self, name: &str) -> ResultEngine<Option<goods::Model>> {
        Ok(goods::Entity::find()
            .filter(goods::Column::Name.eq(name))
            .one(&self.database)
            .await?)
    }

    async fn good_model(&self, good_id: Uuid) -> ResultEngine<goods::Model> {
        goods::Entity::find_by_id(good_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("good not exists".to_string()))
    }

    /// Persist a new stock value for a good.
    ///
    /// In the default mode this is a plain read-modify-write, matching the
    /// behavior the service always had: two concurrent writers race and the
    /// last one wins. With `guarded_stock` enabled the write is conditional
    /// on the stock value previously read and fails with `StockConflict`
    /// when the row changed underneath.
    async fn write_stock(&self, good: &goods::Model, new_stock: i64) -> ResultEngine<()> {
        if self.guarded_stock {
            let res = goods::Entity::update_many()
                .col_expr(goods::Column::Stock, Expr::value(new_stock))
                .filter(goods::Column::Id.eq(good.id.clone()))
                .filter(goods::Column::Stock.eq(good.stock))
                .exec(&self.database)
                .await?;
            if res.rows_affected == 0 {
                return Err(EngineError::StockConflict(good.name.clone()));
            }
        } else {
            let good_model = goods::ActiveModel {
                id: ActiveValue::Set(good.id.clone()),
                stock: ActiveValue::Set(new_stock),
                ..Default::default()
            };
            good_model.update(&self.database).await?;
        }
        Ok(())
    }

    /// Look up the counterparty for a transaction, creating it with
    /// placeholder attributes when the name is unknown.
    ///
    /// A hunter only buys and a merchant only sells; any other pairing fails
    /// with `InvalidRoleDirection` before any lookup happens. The call is
    /// idempotent: a second resolution of the same name finds the row the
    /// first one created.
    pub async fn resolve_counterparty(
        &self,
        name: &str,
        role: CounterpartyRole,
        direction: Direction,
    ) -> ResultEngine<Counterparty> {
        match (role, direction) {
            (CounterpartyRole::Hunter, Direction::Buy)
            | (CounterpartyRole::Merchant, Direction::Sell) => {}
            _ => {
                return Err(EngineError::InvalidRoleDirection(format!(
                    "{} cannot {}",
                    role.as_str(),
                    direction.as_str()
                )));
            }
        }

        match role {
            CounterpartyRole::Hunter => {
                let existing = hunters::Entity::find()
                    .filter(hunters::Column::Name.eq(name))
                    .one(&self.database)
                    .await?;
                let hunter = match existing {
                    Some(model) => Hunter::try_from(model)?,
                    None => {
                        let hunter = Hunter::auto_created(name.to_string());
                        hunters::ActiveModel::from(&hunter)
                            .insert(&self.database)
                            .await?;
                        tracing::debug!(name, "auto-created hunter");
                        hunter
                    }
                };
                Ok(Counterparty::Hunter {
                    hunter_id: hunter.id,
                })
            }
            CounterpartyRole::Merchant => {
                let existing = merchants::Entity::find()
                    .filter(merchants::Column::Name.eq(name))
                    .one(&self.database)
                    .await?;
                let merchant = match existing {
                    Some(model) => Merchant::try_from(model)?,
                    None => {
                        let merchant = Merchant::auto_created(name.to_string());
                        merchants::ActiveModel::from(&merchant)
                            .insert(&self.database)
                            .await?;
                        tracing::debug!(name, "auto-created merchant");
                        merchant
                    }
                };
                Ok(Counterparty::Merchant {
                    merchant_id: merchant.id,
                })
            }
        }
    }

    /// Resolve requested goods lines against the store and apply their stock
    /// effect, accumulating the total value.
    ///
    /// On a buy, lines naming an unknown good or asking for more than the
    /// available stock are skipped, not failed. On a sell, an unknown good is
    /// created with placeholder attributes and `stock = quantity`. Every
    /// stock mutation is persisted as the line is processed; there is no
    /// separate commit step, so lines already applied stay applied if a later
    /// step fails.
    pub async fn process_goods_lines(
        &self,
        requests: &[LineRequest],
        direction: Direction,
    ) -> ResultEngine<ResolvedLines> {
        for request in requests {
            if request.quantity < 1 {
                return Err(EngineError::Validation(
                    "line quantity must be >= 1".to_string(),
                ));
            }
        }

        let mut resolved = ResolvedLines::default();
        for request in requests {
            let model = self.good_model_by_name(&request.name).await?;
            match (direction, model) {
                (Direction::Buy, None) => continue,
                (Direction::Buy, Some(good)) => {
                    if good.stock < request.quantity {
                        continue;
                    }
                    self.write_stock(&good, good.stock - request.quantity)
                        .await?;
                    resolved.lines.push(ResolvedLine {
                        good_id: Uuid::parse_str(&good.id)
                            .map_err(|_| EngineError::KeyNotFound("good not exists".to_string()))?,
                        quantity: request.quantity,
                    });
                    resolved.total_value =
                        accumulate_value(resolved.total_value, good.value, request.quantity)?;
                }
                (Direction::Sell, None) => {
                    let good = Good::auto_created(request.name.clone(), request.quantity);
                    goods::ActiveModel::from(&good).insert(&self.database).await?;
                    tracing::debug!(name = %request.name, "auto-created good");
                    resolved.lines.push(ResolvedLine {
                        good_id: good.id,
                        quantity: request.quantity,
                    });
                    resolved.total_value =
                        accumulate_value(resolved.total_value, good.value, request.quantity)?;
                }
                (Direction::Sell, Some(good)) => {
                    let new_stock = good.stock.checked_add(request.quantity).ok_or_else(|| {
                        EngineError::Validation("stock overflow".to_string())
                    })?;
                    self.write_stock(&good, new_stock).await?;
                    resolved.lines.push(ResolvedLine {
                        good_id: Uuid::parse_str(&good.id)
                            .map_err(|_| EngineError::KeyNotFound("good not exists".to_string()))?,
                        quantity: request.quantity,
                    });
                    resolved.total_value =
                        accumulate_value(resolved.total_value, good.value, request.quantity)?;
                }
            }
        }

        Ok(resolved)
    }

    /// Create a transaction: resolve the counterparty, apply the goods lines
    /// and persist the record.
    ///
    /// Stock changes applied while resolving lines are not rolled back if a
    /// later step fails; the operation has no wrapping storage transaction.
    pub async fn create_transaction(
        &self,
        requests: &[LineRequest],
        counterparty_name: &str,
        role: CounterpartyRole,
        direction: Direction,
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        let counterparty = self
            .resolve_counterparty(counterparty_name, role, direction)
            .await?;

        let resolved = self.process_goods_lines(requests, direction).await?;
        if resolved.lines.is_empty() {
            return Err(EngineError::NoProcessableGoods);
        }

        let mut tx = Transaction::new(counterparty, occurred_at, resolved.total_value)?;
        transactions::ActiveModel::from(&tx).insert(&self.database).await?;

        for line in &resolved.lines {
            let line = Line::new(tx.id, line.good_id, line.quantity)?;
            lines::ActiveModel::from(&line).insert(&self.database).await?;
            tx.lines.push(line);
        }

        Ok(tx)
    }

    /// Update the quantities of a transaction's existing lines.
    ///
    /// Only goods already on the transaction can change; requested names not
    /// on it are ignored, and lines without a matching request stay
    /// untouched. For each matched line the stock delta `new - old` is
    /// re-applied in the transaction's direction, the total is recomputed
    /// from current unit values and the date refreshed.
    ///
    /// Lines whose stock check fails are skipped. If nothing changed at all
    /// the call fails loudly: `InsufficientStock` when at least one line was
    /// rejected by the stock check, `NoUpdateApplied` otherwise. Lines
    /// already applied are persisted as they are processed, so the batch is
    /// not atomic across lines.
    pub async fn update_transaction(
        &self,
        transaction_id: Uuid,
        requests: &[LineRequest],
        occurred_at: DateTime<Utc>,
    ) -> ResultEngine<Transaction> {
        for request in requests {
            if request.quantity < 1 {
                return Err(EngineError::Validation(
                    "line quantity must be >= 1".to_string(),
                ));
            }
        }

        let tx_model = transactions::Entity::find_by_id(transaction_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        let direction = Direction::try_from(tx_model.direction.as_str())?;

        let line_models = lines::Entity::find()
            .filter(lines::Column::TransactionId.eq(transaction_id.to_string()))
            .all(&self.database)
            .await?;

        let requested: HashMap<&str, i64> = requests
            .iter()
            .map(|request| (request.name.as_str(), request.quantity))
            .collect();

        let mut updated = 0usize;
        let mut rejected: Vec<String> = Vec::new();
        let mut total_value = 0i64;
        let mut final_lines = Vec::with_capacity(line_models.len());

        for line_model in line_models {
            let line = Line::try_from(line_model)?;
            let good = self.good_model(line.good_id).await?;

            let mut quantity = line.quantity;
            if let Some(&new_quantity) = requested.get(good.name.as_str()) {
                let diff = new_quantity - line.quantity;
                if diff != 0 {
                    let new_stock = match direction {
                        Direction::Buy => good.stock.checked_sub(diff),
                        Direction::Sell => good.stock.checked_add(diff),
                    }
                    .ok_or_else(|| EngineError::Validation("stock overflow".to_string()))?;
                    if new_stock < 0 {
                        rejected.push(good.name.clone());
                    } else {
                        self.write_stock(&good, new_stock).await?;
                        let line_active = lines::ActiveModel {
                            id: ActiveValue::Set(line.id.to_string()),
                            quantity: ActiveValue::Set(new_quantity),
                            ..Default::default()
                        };
                        line_active.update(&self.database).await?;
                        quantity = new_quantity;
                        updated += 1;
                    }
                }
            }

            total_value = accumulate_value(total_value, good.value, quantity)?;
            final_lines.push(Line {
                quantity,
                ..line
            });
        }

        if updated == 0 {
            if rejected.is_empty() {
                return Err(EngineError::NoUpdateApplied);
            }
            return Err(EngineError::InsufficientStock(rejected.join(", ")));
        }

        let tx_active = transactions::ActiveModel {
            id: ActiveValue::Set(transaction_id.to_string()),
            total_value: ActiveValue::Set(total_value),
            occurred_at: ActiveValue::Set(occurred_at),
            ..Default::default()
        };
        tx_active.update(&self.database).await?;

        let mut tx = Transaction::try_from(tx_model)?;
        tx.total_value = total_value;
        tx.occurred_at = occurred_at;
        tx.lines = final_lines;
        Ok(tx)
    }

    /// Delete a transaction, reversing its stock effect.
    ///
    /// Every reversal is computed and checked before any write: a buy gives
    /// the units back, a sell takes them away again. If any sell reversal
    /// would leave negative stock the whole deletion is refused with
    /// `IrreversibleDelete` and nothing is mutated, making delete the one
    /// all-or-nothing ledger operation.
    pub async fn delete_transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        let tx_model = transactions::Entity::find_by_id(transaction_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;
        let direction = Direction::try_from(tx_model.direction.as_str())?;

        let line_models = lines::Entity::find()
            .filter(lines::Column::TransactionId.eq(transaction_id.to_string()))
            .all(&self.database)
            .await?;

        let mut reversals: Vec<(goods::Model, i64)> = Vec::with_capacity(line_models.len());
        let mut tx_lines = Vec::with_capacity(line_models.len());
        for line_model in line_models {
            let line = Line::try_from(line_model)?;
            let good = self.good_model(line.good_id).await?;
            let reversed = match direction {
                Direction::Buy => good.stock.checked_add(line.quantity),
                Direction::Sell => good.stock.checked_sub(line.quantity),
            }
            .ok_or_else(|| EngineError::Validation("stock overflow".to_string()))?;
            if reversed < 0 {
                return Err(EngineError::IrreversibleDelete(good.name));
            }
            reversals.push((good, reversed));
            tx_lines.push(line);
        }

        for (good, reversed) in &reversals {
            self.write_stock(good, *reversed).await?;
        }

        lines::Entity::delete_many()
            .filter(lines::Column::TransactionId.eq(transaction_id.to_string()))
            .exec(&self.database)
            .await?;
        transactions::Entity::delete_by_id(transaction_id.to_string())
            .exec(&self.database)
            .await?;

        let mut tx = Transaction::try_from(tx_model)?;
        tx.lines = tx_lines;
        Ok(tx)
    }

    /// Return a [`Transaction`] with its lines.
    pub async fn transaction(&self, transaction_id: Uuid) -> ResultEngine<Transaction> {
        let tx_model = transactions::Entity::find_by_id(transaction_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("transaction not exists".to_string()))?;

        let line_models = lines::Entity::find()
            .filter(lines::Column::TransactionId.eq(transaction_id.to_string()))
            .all(&self.database)
            .await?;

        let mut tx = Transaction::try_from(tx_model)?;
        for line_model in line_models {
            tx.lines.push(Line::try_from(line_model)?);
        }
        Ok(tx)
    }

    /// Lists transactions, newest first, honoring the optional filters.
    ///
    /// When `involved_name` is set the name is resolved against hunters and
    /// merchants; an unknown name yields `KeyNotFound`.
    pub async fn list_transactions(
        &self,
        filter: &TransactionFilter,
    ) -> ResultEngine<Vec<Transaction>> {
        let mut query = transactions::Entity::find()
            .order_by_desc(transactions::Column::OccurredAt);

        if let Some(name) = &filter.involved_name {
            let counterparty = self.counterparty_by_name(name).await?;
            query = query
                .filter(transactions::Column::CounterpartyId.eq(counterparty.id().to_string()))
                .filter(
                    transactions::Column::CounterpartyRole
                        .eq(counterparty.role().as_str()),
                );
        }
        if let Some(direction) = filter.direction {
            query = query.filter(transactions::Column::Direction.eq(direction.as_str()));
        }
        if let Some(from) = filter.from {
            query = query.filter(transactions::Column::OccurredAt.gte(from));
        }
        if let Some(to) = filter.to {
            query = query.filter(transactions::Column::OccurredAt.lte(to));
        }

        let models = query.all(&self.database).await?;
        let mut out = Vec::with_capacity(models.len());
        for model in models {
            let line_models = lines::Entity::find()
                .filter(lines::Column::TransactionId.eq(model.id.clone()))
                .all(&self.database)
                .await?;
            let mut tx = Transaction::try_from(model)?;
            for line_model in line_models {
                tx.lines.push(Line::try_from(line_model)?);
            }
            out.push(tx);
        }
        Ok(out)
    }

    /// Resolve a name against hunters first, then merchants, without
    /// creating anything.
    pub async fn counterparty_by_name(&self, name: &str) -> ResultEngine<Counterparty> {
        if let Some(model) = hunters::Entity::find()
            .filter(hunters::Column::Name.eq(name))
            .one(&self.database)
            .await?
        {
            let hunter = Hunter::try_from(model)?;
            return Ok(Counterparty::Hunter {
                hunter_id: hunter.id,
            });
        }
        if let Some(model) = merchants::Entity::find()
            .filter(merchants::Column::Name.eq(name))
            .one(&self.database)
            .await?
        {
            let merchant = Merchant::try_from(model)?;
            return Ok(Counterparty::Merchant {
                merchant_id: merchant.id,
            });
        }
        Err(EngineError::KeyNotFound(name.to_string()))
    }

    /// Add a new good to the store.
    pub async fn new_good(
        &self,
        name: &str,
        description: &str,
        material: Material,
        weight: f64,
        stock: i64,
        value: i64,
    ) -> ResultEngine<Good> {
        if self.good_model_by_name(name).await?.is_some() {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
        let good = Good::new(
            name.to_string(),
            description.to_string(),
            material,
            weight,
            stock,
            value,
        )?;
        goods::ActiveModel::from(&good).insert(&self.database).await?;
        Ok(good)
    }

    /// Return a [`Good`].
    pub async fn good(&self, good_id: Uuid) -> ResultEngine<Good> {
        Good::try_from(self.good_model(good_id).await?)
    }

    pub async fn good_by_name(&self, name: &str) -> ResultEngine<Good> {
        let model = self
            .good_model_by_name(name)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound(name.to_string()))?;
        Good::try_from(model)
    }

    pub async fn list_goods(&self, filter: &GoodFilter) -> ResultEngine<Vec<Good>> {
        let mut query = goods::Entity::find().order_by_asc(goods::Column::Name);
        if let Some(name) = &filter.name {
            query = query.filter(goods::Column::Name.eq(name.clone()));
        }
        if let Some(description) = &filter.description {
            query = query.filter(goods::Column::Description.eq(description.clone()));
        }
        if let Some(material) = filter.material {
            query = query.filter(goods::Column::Material.eq(material.as_str()));
        }

        let models = query.all(&self.database).await?;
        models.into_iter().map(Good::try_from).collect()
    }

    /// Apply whitelisted field changes to a good, re-validating the result.
    pub async fn update_good(&self, good_id: Uuid, changes: GoodChanges) -> ResultEngine<Good> {
        let model = self.good_model(good_id).await?;
        let mut good = Good::try_from(model)?;

        if let Some(name) = changes.name {
            if name != good.name && self.good_model_by_name(&name).await?.is_some() {
                return Err(EngineError::ExistingKey(name));
            }
            good.name = name;
        }
        if let Some(description) = changes.description {
            good.description = description;
        }
        if let Some(material) = changes.material {
            good.material = material;
        }
        if let Some(weight) = changes.weight {
            good.weight = weight;
        }
        if let Some(stock) = changes.stock {
            good.stock = stock;
        }
        if let Some(value) = changes.value {
            good.value = value;
        }

        validation::good_rules().check(&good)?;
        validation::good_stock_rule().check(&good)?;

        let mut active = goods::ActiveModel::from(&good);
        active.id = ActiveValue::Unchanged(good.id.to_string());
        active.update(&self.database).await?;
        Ok(good)
    }

    /// Delete a good, returning the removed record.
    ///
    /// A good still referenced by transaction lines cannot be removed; the
    /// ledger keeps pointing at it until the transactions are deleted.
    pub async fn delete_good(&self, good_id: Uuid) -> ResultEngine<Good> {
        let good = Good::try_from(self.good_model(good_id).await?)?;
        let referenced = lines::Entity::find()
            .filter(lines::Column::GoodId.eq(good_id.to_string()))
            .one(&self.database)
            .await?;
        if referenced.is_some() {
            return Err(EngineError::Validation(format!(
                "{} is referenced by transaction lines",
                good.name
            )));
        }
        goods::Entity::delete_by_id(good_id.to_string())
            .exec(&self.database)
            .await?;
        Ok(good)
    }

    /// Add a new hunter.
    pub async fn new_hunter(
        &self,
        name: &str,
        race: Race,
        location: &str,
    ) -> ResultEngine<Hunter> {
        let existing = hunters::Entity::find()
            .filter(hunters::Column::Name.eq(name))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
        let hunter = Hunter::new(name.to_string(), race, location.to_string())?;
        hunters::ActiveModel::from(&hunter)
            .insert(&self.database)
            .await?;
        Ok(hunter)
    }

    pub async fn hunter(&self, hunter_id: Uuid) -> ResultEngine<Hunter> {
        let model = hunters::Entity::find_by_id(hunter_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("hunter not exists".to_string()))?;
        Hunter::try_from(model)
    }

    pub async fn list_hunters(&self, name: Option<&str>) -> ResultEngine<Vec<Hunter>> {
        let mut query = hunters::Entity::find().order_by_asc(hunters::Column::Name);
        if let Some(name) = name {
            query = query.filter(hunters::Column::Name.eq(name));
        }
        let models = query.all(&self.database).await?;
        models.into_iter().map(Hunter::try_from).collect()
    }

    pub async fn update_hunter(
        &self,
        hunter_id: Uuid,
        changes: HunterChanges,
    ) -> ResultEngine<Hunter> {
        let mut hunter = self.hunter(hunter_id).await?;

        if let Some(name) = changes.name {
            if name != hunter.name {
                let clash = hunters::Entity::find()
                    .filter(hunters::Column::Name.eq(name.clone()))
                    .one(&self.database)
                    .await?;
                if clash.is_some() {
                    return Err(EngineError::ExistingKey(name));
                }
            }
            hunter.name = name;
        }
        if let Some(race) = changes.race {
            hunter.race = race;
        }
        if let Some(location) = changes.location {
            hunter.location = location;
        }

        validation::hunter_rules().check(&hunter)?;

        let mut active = hunters::ActiveModel::from(&hunter);
        active.id = ActiveValue::Unchanged(hunter.id.to_string());
        active.update(&self.database).await?;
        Ok(hunter)
    }

    pub async fn delete_hunter(&self, hunter_id: Uuid) -> ResultEngine<Hunter> {
        let hunter = self.hunter(hunter_id).await?;
        hunters::Entity::delete_by_id(hunter_id.to_string())
            .exec(&self.database)
            .await?;
        Ok(hunter)
    }

    /// Add a new merchant.
    pub async fn new_merchant(
        &self,
        name: &str,
        kind: MerchantKind,
        location: &str,
    ) -> ResultEngine<Merchant> {
        let existing = merchants::Entity::find()
            .filter(merchants::Column::Name.eq(name))
            .one(&self.database)
            .await?;
        if existing.is_some() {
            return Err(EngineError::ExistingKey(name.to_string()));
        }
        let merchant = Merchant::new(name.to_string(), kind, location.to_string())?;
        merchants::ActiveModel::from(&merchant)
            .insert(&self.database)
            .await?;
        Ok(merchant)
    }

    pub async fn merchant(&self, merchant_id: Uuid) -> ResultEngine<Merchant> {
        let model = merchants::Entity::find_by_id(merchant_id.to_string())
            .one(&self.database)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("merchant not exists".to_string()))?;
        Merchant::try_from(model)
    }

    pub async fn list_merchants(&self, name: Option<&str>) -> ResultEngine<Vec<Merchant>> {
        let mut query = merchants::Entity::find().order_by_asc(merchants::Column::Name);
        if let Some(name) = name {
            query = query.filter(merchants::Column::Name.eq(name));
        }
        let models = query.all(&self.database).await?;
        models.into_iter().map(Merchant::try_from).collect()
    }

    pub async fn update_merchant(
        &self,
        merchant_id: Uuid,
        changes: MerchantChanges,
    ) -> ResultEngine<Merchant> {
        let mut merchant = self.merchant(merchant_id).await?;

        if let Some(name) = changes.name {
            if name != merchant.name {
                let clash = merchants::Entity::find()
                    .filter(merchants::Column::Name.eq(name.clone()))
                    .one(&self.database)
                    .await?;
                if clash.is_some() {
                    return Err(EngineError::ExistingKey(name));
                }
            }
            merchant.name = name;
        }
        if let Some(kind) = changes.kind {
            merchant.kind = kind;
        }
        if let Some(location) = changes.location {
            merchant.location = location;
        }

        validation::merchant_rules().check(&merchant)?;

        let mut active = merchants::ActiveModel::from(&merchant);
        active.id = ActiveValue::Unchanged(merchant.id.to_string());
        active.update(&self.database).await?;
        Ok(merchant)
    }

    pub async fn delete_merchant(&self, merchant_id: Uuid) -> ResultEngine<Merchant> {
        let merchant = self.merchant(merchant_id).await?;
        merchants::Entity::delete_by_id(merchant_id.to_string())
            .exec(&self.database)
            .await?;
        Ok(merchant)
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    guarded_stock: bool,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Use compare-and-swap stock writes instead of the default last-write-
    /// wins behavior. Off by default.
    pub fn guarded_stock(mut self, guarded: bool) -> EngineBuilder {
        self.guarded_stock = guarded;
        self
    }

    /// Construct `Engine`
    pub fn build(self) -> Engine {
        Engine {
            database: self.database,
            guarded_stock: self.guarded_stock,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use migration::MigratorTrait;
    use sea_orm::Database;

    async fn engine_with_db(guarded: bool) -> Engine {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        migration::Migrator::up(&db, None).await.unwrap();
        Engine::builder()
            .database(db)
            .guarded_stock(guarded)
            .build()
    }

    async fn seed_good(engine: &Engine) -> Good {
        engine
            .new_good(
                "Silver Sword",
                "A fine blade of meteorite silver",
                Material::Silver,
                3.5,
                10,
                500,
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn guarded_write_refuses_stale_stock() {
        let engine = engine_with_db(true).await;
        let good = seed_good(&engine).await;

        // Read the row, then change its stock underneath the reader.
        let stale = engine.good_model(good.id).await.unwrap();
        engine
            .update_good(
                good.id,
                GoodChanges {
                    stock: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let err = engine.write_stock(&stale, 4).await.unwrap_err();
        assert!(matches!(err, EngineError::StockConflict(_)));
        assert_eq!(engine.good(good.id).await.unwrap().stock, 7);
    }

    #[tokio::test]
    async fn unguarded_write_lets_the_last_writer_win() {
        let engine = engine_with_db(false).await;
        let good = seed_good(&engine).await;

        let stale = engine.good_model(good.id).await.unwrap();
        engine
            .update_good(
                good.id,
                GoodChanges {
                    stock: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        engine.write_stock(&stale, 4).await.unwrap();
        assert_eq!(engine.good(good.id).await.unwrap().stock, 4);
    }
}
