//! The entity store.

use std::sync::Arc;

use booklend_core::ledger::{self, FineSummary};
use booklend_core::transaction::{format_date, format_timestamp};
use booklend_core::{
    form, promote, seed_catalog, Book, BookDraft, ClassConfig, CoreError, FormEntry, FormField,
    Ledger, LedgerError, LoanAction, Member, MemberDraft, MemberType, PersistentForms,
    PromotionSummary, ResolutionMethod, RosterRow, StockAdjustment, Transaction,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::backup::{Backup, BACKUP_VERSION};
use crate::clock::{Clock, SystemClock};
use crate::persistence::{ContainerKey, Persistence};
use crate::settings::Settings;
use crate::StoreError;

/// A loan action to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRequest {
    /// Book to move.
    pub book_id: String,
    /// Borrow, return or damage report.
    pub action: LoanAction,
    /// Name the loan is recorded against.
    pub user_name: String,
    /// Teacher or student.
    pub user_type: MemberType,
    /// Units, at least 1.
    pub quantity: u32,
}

impl LoanRequest {
    /// A single-unit request.
    pub fn new(
        book_id: impl Into<String>,
        action: LoanAction,
        user_name: impl Into<String>,
        user_type: MemberType,
    ) -> Self {
        Self {
            book_id: book_id.into(),
            action,
            user_name: user_name.into(),
            user_type,
            quantity: 1,
        }
    }

    /// Request for a known member.
    pub fn for_member(book_id: impl Into<String>, action: LoanAction, member: &Member) -> Self {
        Self::new(book_id, action, member.name.clone(), member.member_type)
    }

    /// Set the quantity.
    #[must_use]
    pub const fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }
}

/// What a confirmed roster import created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// New members, in row order.
    pub members: Vec<Member>,
    /// Classes registered because a row named them.
    pub classes_added: Vec<(u8, String)>,
}

/// A catalog title with its on-loan count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLine {
    /// The book.
    pub book: Book,
    /// Units currently out, from active-loan replay.
    pub on_loan: u32,
}

/// The in-memory state the store owns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct State {
    books: Vec<Book>,
    members: Vec<Member>,
    classes: ClassConfig,
    transactions: Ledger,
    forms: PersistentForms,
    settings: Settings,
}

/// Authoritative state with write-through persistence.
///
/// Every mutating method validates first and only then changes state, so a
/// returned error means nothing changed. After a change, the touched
/// containers are written to the backend immediately. Write failures are
/// logged and do not undo the in-memory change.
pub struct Store<P: Persistence> {
    persistence: P,
    clock: Arc<dyn Clock>,
    state: State,
    load_warnings: Vec<StoreError>,
    last_stamp: i64,
}

impl<P: Persistence> Store<P> {
    /// Load every container from `persistence` using the system clock.
    pub fn open(persistence: P) -> Self {
        Self::open_with_clock(persistence, Arc::new(SystemClock))
    }

    /// Load every container with an explicit clock.
    ///
    /// Absent containers start from their defaults (the seed catalog for
    /// books). Unreadable or malformed ones also fall back to defaults and
    /// are reported through [`Store::load_warnings`].
    pub fn open_with_clock(persistence: P, clock: Arc<dyn Clock>) -> Self {
        let mut warnings = Vec::new();
        let state = State {
            books: load_container(&persistence, ContainerKey::Books, seed_catalog, &mut warnings),
            transactions: load_container(
                &persistence,
                ContainerKey::Transactions,
                Ledger::new,
                &mut warnings,
            ),
            members: load_container(&persistence, ContainerKey::Members, Vec::new, &mut warnings),
            classes: load_container(
                &persistence,
                ContainerKey::Classes,
                ClassConfig::new,
                &mut warnings,
            ),
            settings: load_container(
                &persistence,
                ContainerKey::Settings,
                Settings::default,
                &mut warnings,
            ),
            forms: load_container(
                &persistence,
                ContainerKey::PersistentForms,
                PersistentForms::new,
                &mut warnings,
            ),
        };
        let last_stamp = state.transactions.latest_created_at().unwrap_or(0);
        info!(
            books = state.books.len(),
            members = state.members.len(),
            transactions = state.transactions.len(),
            warnings = warnings.len(),
            "store loaded"
        );
        Self {
            persistence,
            clock,
            state,
            load_warnings: warnings,
            last_stamp,
        }
    }

    /// Problems met while loading. Each affected container was reset to
    /// its default.
    #[must_use]
    pub fn load_warnings(&self) -> &[StoreError] {
        &self.load_warnings
    }

    /// The persistence backend.
    #[must_use]
    pub const fn persistence(&self) -> &P {
        &self.persistence
    }

    // ===== Reads =====

    /// The catalog.
    #[must_use]
    pub fn books(&self) -> &[Book] {
        &self.state.books
    }

    /// A book by id.
    #[must_use]
    pub fn book(&self, id: &str) -> Option<&Book> {
        self.state.books.iter().find(|b| b.id == id)
    }

    /// A book by id, or by catalog code (case-insensitive).
    #[must_use]
    pub fn find_book(&self, id_or_code: &str) -> Option<&Book> {
        let code = id_or_code.trim().to_uppercase();
        self.book(id_or_code)
            .or_else(|| self.state.books.iter().find(|b| b.code == code))
    }

    /// The roster.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.state.members
    }

    /// A member by id.
    #[must_use]
    pub fn member(&self, id: &str) -> Option<&Member> {
        self.state.members.iter().find(|m| m.id == id)
    }

    /// A member by name, ignoring case and surrounding blanks.
    #[must_use]
    pub fn member_by_name(&self, name: &str) -> Option<&Member> {
        self.state.members.iter().find(|m| m.matches_name(name))
    }

    /// A member by id, falling back to name.
    #[must_use]
    pub fn find_member(&self, id_or_name: &str) -> Option<&Member> {
        self.member(id_or_name)
            .or_else(|| self.member_by_name(id_or_name))
    }

    /// Registered classes.
    #[must_use]
    pub const fn classes(&self) -> &ClassConfig {
        &self.state.classes
    }

    /// The ledger.
    #[must_use]
    pub const fn ledger(&self) -> &Ledger {
        &self.state.transactions
    }

    /// Stored form entries.
    #[must_use]
    pub const fn forms(&self) -> &PersistentForms {
        &self.state.forms
    }

    /// School settings.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.state.settings
    }

    /// Loans a member currently holds, oldest first.
    #[must_use]
    pub fn active_loans(&self, member_name: &str) -> Vec<&Transaction> {
        self.state.transactions.active_loans(member_name)
    }

    /// Fine totals over the whole ledger.
    #[must_use]
    pub fn fine_summary(&self) -> FineSummary {
        ledger::fine_summary(self.state.transactions.entries())
    }

    /// Fine totals for one member name.
    #[must_use]
    pub fn member_fines(&self, member_name: &str) -> FineSummary {
        ledger::fine_summary(self.state.transactions.for_user(member_name))
    }

    /// Damage records still owed, most recent first.
    #[must_use]
    pub fn outstanding_fines(&self) -> Vec<&Transaction> {
        self.state
            .transactions
            .entries()
            .iter()
            .filter(|t| t.is_outstanding())
            .collect()
    }

    /// Every book with its on-loan count.
    #[must_use]
    pub fn stock_report(&self) -> Vec<StockLine> {
        self.state
            .books
            .iter()
            .map(|book| StockLine {
                on_loan: self.state.transactions.on_loan(&book.id),
                book: book.clone(),
            })
            .collect()
    }

    // ===== Books =====

    /// Add a book to the catalog.
    pub fn add_book(&mut self, draft: BookDraft) -> Result<Book, StoreError> {
        let id = self.fresh_id("B", |s, id| s.book(id).is_some());
        let book = Book::from_draft(id, draft)?;
        self.state.books.push(book.clone());
        self.commit(&[ContainerKey::Books]);
        info!(book = %book.id, title = %book.title, "book added");
        Ok(book)
    }

    /// Replace a book's editable fields. Stock is kept; only ledger actions
    /// move it.
    pub fn update_book(&mut self, id: &str, draft: BookDraft) -> Result<Book, StoreError> {
        let book = self
            .state
            .books
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| StoreError::BookNotFound(id.to_string()))?;
        book.update(draft)?;
        let book = book.clone();
        self.commit(&[ContainerKey::Books]);
        info!(book = %book.id, "book updated");
        Ok(book)
    }

    /// Remove a book. Past transactions keep their title snapshot.
    pub fn delete_book(&mut self, id: &str) -> Result<Book, StoreError> {
        let pos = self
            .state
            .books
            .iter()
            .position(|b| b.id == id)
            .ok_or_else(|| StoreError::BookNotFound(id.to_string()))?;
        let book = self.state.books.remove(pos);
        self.commit(&[ContainerKey::Books]);
        info!(book = %book.id, "book deleted");
        Ok(book)
    }

    // ===== Members =====

    /// Add a member.
    pub fn add_member(&mut self, draft: MemberDraft) -> Result<Member, StoreError> {
        let id = self.fresh_id("M", |s, id| s.member(id).is_some());
        let member = Member::from_draft(id, draft)?;
        self.state.members.push(member.clone());
        self.commit(&[ContainerKey::Members]);
        info!(member = %member.id, name = %member.name, "member added");
        Ok(member)
    }

    /// Replace a member's editable fields.
    pub fn update_member(&mut self, id: &str, draft: MemberDraft) -> Result<Member, StoreError> {
        let member = self
            .state
            .members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| StoreError::MemberNotFound(id.to_string()))?;
        member.update(draft)?;
        let member = member.clone();
        self.commit(&[ContainerKey::Members]);
        info!(member = %member.id, "member updated");
        Ok(member)
    }

    /// Remove a member and their stored form entries. Ledger records under
    /// the member's name stay as history.
    pub fn delete_member(&mut self, id: &str) -> Result<Member, StoreError> {
        let pos = self
            .state
            .members
            .iter()
            .position(|m| m.id == id)
            .ok_or_else(|| StoreError::MemberNotFound(id.to_string()))?;
        let member = self.state.members.remove(pos);
        let had_forms = self.state.forms.remove_member(&member.id);
        if had_forms {
            self.commit(&[ContainerKey::Members, ContainerKey::PersistentForms]);
        } else {
            self.commit(&[ContainerKey::Members]);
        }
        info!(member = %member.id, "member deleted");
        Ok(member)
    }

    // ===== Classes =====

    /// Register a class for a year.
    pub fn add_class(&mut self, year: u8, name: &str) -> Result<String, StoreError> {
        let name = self.state.classes.add(year, name)?;
        self.commit(&[ContainerKey::Classes]);
        info!(year, class = %name, "class added");
        Ok(name)
    }

    /// Unregister a class. Members keep their class name.
    pub fn remove_class(&mut self, year: u8, name: &str) -> bool {
        let removed = self.state.classes.remove(year, name);
        if removed {
            self.commit(&[ContainerKey::Classes]);
            info!(year, class = %name.trim().to_uppercase(), "class removed");
        }
        removed
    }

    // ===== Ledger =====

    /// Apply a borrow, return or damage report.
    ///
    /// Moves stock, prepends a transaction and, when a member with the
    /// recorded name exists, updates their form entry for the book. Either
    /// all three happen or none does.
    pub fn apply_action(&mut self, request: LoanRequest) -> Result<Transaction, StoreError> {
        let user_name = request.user_name.trim().to_uppercase();
        if user_name.is_empty() {
            return Err(CoreError::EmptyField("user name").into());
        }
        let idx = self
            .state
            .books
            .iter()
            .position(|b| b.id == request.book_id)
            .ok_or_else(|| StoreError::BookNotFound(request.book_id.clone()))?;
        let new_stock =
            ledger::stock_after(&self.state.books[idx], request.action, request.quantity)?;

        let stamp = self.next_stamp();
        let tx = Transaction::new(
            format!("T{stamp}"),
            &self.state.books[idx],
            request.action,
            (user_name.as_str(), request.user_type),
            request.quantity,
            stamp,
        );

        self.state.books[idx].stock = new_stock;
        self.state.transactions.record(tx.clone());
        let mut keys = vec![ContainerKey::Books, ContainerKey::Transactions];
        if let Some(member_id) = self.member_by_name(&user_name).map(|m| m.id.clone()) {
            let today = format_date(stamp);
            match request.action {
                LoanAction::Borrow => {
                    self.state.forms.record_borrow(&member_id, &tx.book_id, &today);
                }
                LoanAction::Return | LoanAction::ReturnDamaged => self.state.forms.record_return(
                    &member_id,
                    &tx.book_id,
                    &today,
                    request.action == LoanAction::ReturnDamaged,
                ),
            }
            keys.push(ContainerKey::PersistentForms);
        }
        self.commit(&keys);

        info!(
            tx = %tx.id,
            book = %tx.book_id,
            user = %tx.user_name,
            action = %tx.action,
            quantity = tx.quantity,
            stock = new_stock,
            "ledger action applied"
        );
        Ok(tx)
    }

    /// Settle a damage record in cash or with a replacement copy.
    ///
    /// Settling again is allowed as a correction. A replacement credits the
    /// book one unit the first time; switching a replacement back to cash
    /// takes that unit back, which fails with insufficient stock if it has
    /// since been lent out.
    pub fn resolve_damage(
        &mut self,
        tx_id: &str,
        method: ResolutionMethod,
    ) -> Result<Transaction, StoreError> {
        let tx = self
            .state
            .transactions
            .get(tx_id)
            .ok_or_else(|| StoreError::TransactionNotFound(tx_id.to_string()))?;
        let adjustment = ledger::settlement_adjustment(tx, method)?;
        let book_id = tx.book_id.clone();

        let mut stock_change = None;
        if adjustment != StockAdjustment::Unchanged {
            let idx = self
                .state
                .books
                .iter()
                .position(|b| b.id == book_id)
                .ok_or_else(|| StoreError::BookNotFound(book_id.clone()))?;
            let stock = self.state.books[idx].stock;
            let new_stock = adjustment.apply(stock).ok_or_else(|| {
                LedgerError::InsufficientStock {
                    book_id: book_id.clone(),
                    requested: 1,
                    available: stock,
                }
            })?;
            stock_change = Some((idx, new_stock));
        }

        let mut keys = vec![ContainerKey::Transactions];
        if let Some((idx, new_stock)) = stock_change {
            self.state.books[idx].stock = new_stock;
            keys.push(ContainerKey::Books);
        }
        let settled = self
            .state
            .transactions
            .settle(tx_id, method)
            .cloned()
            .ok_or_else(|| StoreError::TransactionNotFound(tx_id.to_string()))?;
        self.commit(&keys);

        info!(tx = %settled.id, method = %method, ?adjustment, "damage resolved");
        Ok(settled)
    }

    /// Erase the whole ledger. Stock counts are left as they are.
    pub fn reset_transactions(&mut self) -> usize {
        let count = self.state.transactions.len();
        self.state.transactions.clear();
        self.commit(&[ContainerKey::Transactions]);
        warn!(count, "ledger reset");
        count
    }

    // ===== Forms =====

    /// Form entry for a member and book: stored if present, else derived.
    pub fn form_snapshot(&self, member_id: &str, book_id: &str) -> Result<FormEntry, StoreError> {
        let member = self
            .member(member_id)
            .ok_or_else(|| StoreError::MemberNotFound(member_id.to_string()))?;
        Ok(form::snapshot(
            &self.state.forms,
            &self.state.transactions,
            member,
            book_id,
        ))
    }

    /// Edit one field of a member's form entry and store it.
    pub fn set_form_field(
        &mut self,
        member_id: &str,
        book_id: &str,
        field: FormField,
        value: &str,
    ) -> Result<FormEntry, StoreError> {
        if self.member(member_id).is_none() {
            return Err(StoreError::MemberNotFound(member_id.to_string()));
        }
        self.state.forms.set_field(member_id, book_id, field, value);
        self.commit(&[ContainerKey::PersistentForms]);
        debug!(member = member_id, book = book_id, %field, "form field set");
        Ok(self
            .state
            .forms
            .get(member_id, book_id)
            .cloned()
            .unwrap_or_default())
    }

    /// Rows of a member's printable loan form.
    ///
    /// Students get every book of their year. Teachers get every book they
    /// have a stored entry or a ledger record for.
    pub fn form_rows(&self, member_id: &str) -> Result<Vec<(&Book, FormEntry)>, StoreError> {
        let member = self
            .member(member_id)
            .ok_or_else(|| StoreError::MemberNotFound(member_id.to_string()))?;
        let stored = self.state.forms.member_entries(&member.id);
        let rows = self
            .state
            .books
            .iter()
            .filter(|book| match member.year {
                Some(year) if member.is_student() => book.year == year,
                _ => {
                    stored.is_some_and(|s| s.contains_key(&book.id))
                        || self
                            .state
                            .transactions
                            .for_user(&member.name)
                            .any(|t| t.book_id == book.id)
                }
            })
            .map(|book| {
                let entry = form::snapshot(
                    &self.state.forms,
                    &self.state.transactions,
                    member,
                    &book.id,
                );
                (book, entry)
            })
            .collect();
        Ok(rows)
    }

    // ===== Session =====

    /// Promote every student a year; final-year students are removed.
    pub fn promote(&mut self) -> PromotionSummary {
        let summary = promote(&mut self.state.members);
        self.commit(&[ContainerKey::Members]);
        info!(
            promoted = summary.promoted,
            graduated = summary.graduated.len(),
            "members promoted"
        );
        summary
    }

    /// Remove every member and every stored form entry.
    pub fn reset_all_members(&mut self) -> usize {
        let count = self.state.members.len();
        self.state.members.clear();
        self.state.forms.clear();
        self.commit(&[ContainerKey::Members, ContainerKey::PersistentForms]);
        warn!(count, "roster reset");
        count
    }

    // ===== Roster import =====

    /// Create a student for every staged row and register the classes the
    /// rows name.
    ///
    /// All rows are validated before anything is added.
    pub fn confirm_import(&mut self, rows: &[RosterRow]) -> Result<ImportSummary, StoreError> {
        let mut members = Vec::with_capacity(rows.len());
        for row in rows {
            let id = self.fresh_id("M", |s, id| {
                s.member(id).is_some() || members.iter().any(|m: &Member| m.id == id)
            });
            members.push(Member::from_draft(id, row.to_member_draft())?);
        }

        let mut classes_added = Vec::new();
        for row in rows.iter().filter(|r| r.has_class()) {
            if self.state.classes.ensure(row.year, &row.class_name) {
                classes_added.push((row.year, row.class_name.clone()));
            }
        }
        self.state.members.extend(members.iter().cloned());
        self.commit(&[ContainerKey::Members, ContainerKey::Classes]);

        info!(
            members = members.len(),
            classes = classes_added.len(),
            "roster import confirmed"
        );
        Ok(ImportSummary {
            members,
            classes_added,
        })
    }

    // ===== Settings =====

    /// Replace the school settings.
    pub fn update_settings(&mut self, settings: Settings) {
        self.state.settings = settings;
        self.commit(&[ContainerKey::Settings]);
        info!("settings updated");
    }

    // ===== Backup =====

    /// Snapshot the five entity containers.
    #[must_use]
    pub fn export_backup(&self) -> Backup {
        Backup {
            version: BACKUP_VERSION.to_string(),
            exported_at: format_timestamp(self.clock.now_millis()),
            books: self.state.books.clone(),
            members: self.state.members.clone(),
            classes: self.state.classes.clone(),
            transactions: self.state.transactions.clone(),
            persistent_forms: self.state.forms.clone(),
        }
    }

    /// Replace the five entity containers with a backup. Settings stay.
    pub fn restore_backup(&mut self, backup: Backup) {
        self.state.books = backup.books;
        self.state.members = backup.members;
        self.state.classes = backup.classes;
        self.state.transactions = backup.transactions;
        self.state.forms = backup.persistent_forms;
        self.last_stamp = self.state.transactions.latest_created_at().unwrap_or(0);
        self.commit(&[
            ContainerKey::Books,
            ContainerKey::Members,
            ContainerKey::Classes,
            ContainerKey::Transactions,
            ContainerKey::PersistentForms,
        ]);
        warn!(
            version = %backup.version,
            exported_at = %backup.exported_at,
            "state restored from backup"
        );
    }

    /// Parse and restore a backup document.
    pub fn restore_json(&mut self, json: &str) -> Result<(), StoreError> {
        let backup = Backup::from_json(json)?;
        self.restore_backup(backup);
        Ok(())
    }

    // ===== Internals =====

    /// Strictly increasing millisecond stamp.
    fn next_stamp(&mut self) -> i64 {
        let stamp = self.clock.now_millis().max(self.last_stamp + 1);
        self.last_stamp = stamp;
        stamp
    }

    fn fresh_id(&mut self, prefix: &str, taken: impl Fn(&Self, &str) -> bool) -> String {
        loop {
            let id = format!("{prefix}{}", self.next_stamp());
            if !taken(self, &id) {
                return id;
            }
        }
    }

    fn commit(&mut self, keys: &[ContainerKey]) {
        for key in keys {
            let encoded = match key {
                ContainerKey::Books => encode(*key, &self.state.books),
                ContainerKey::Transactions => encode(*key, &self.state.transactions),
                ContainerKey::Members => encode(*key, &self.state.members),
                ContainerKey::Classes => encode(*key, &self.state.classes),
                ContainerKey::Settings => encode(*key, &self.state.settings),
                ContainerKey::PersistentForms => encode(*key, &self.state.forms),
            };
            let result = encoded.and_then(|json| self.persistence.save(key.as_str(), &json));
            if let Err(e) = result {
                error!(key = %key, error = %e, "failed to persist container");
            }
        }
    }
}

fn encode<T: Serialize>(key: ContainerKey, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|source| StoreError::Encode {
        key: key.as_str().to_string(),
        source,
    })
}

fn load_container<P, T>(
    persistence: &P,
    key: ContainerKey,
    default: impl FnOnce() -> T,
    warnings: &mut Vec<StoreError>,
) -> T
where
    P: Persistence,
    T: DeserializeOwned,
{
    match persistence.load(key.as_str()) {
        Ok(None) => {
            debug!(key = %key, "container absent, using default");
            default()
        }
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(value) => value,
            Err(e) => {
                warn!(key = %key, error = %e, "malformed container, using default");
                warnings.push(StoreError::MalformedPersistedState {
                    key: key.as_str().to_string(),
                    message: e.to_string(),
                });
                default()
            }
        },
        Err(e) => {
            warn!(key = %key, error = %e, "unreadable container, using default");
            warnings.push(e);
            default()
        }
    }
}
