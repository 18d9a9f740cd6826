//! In-memory adapters and fixtures shared by unit and integration tests.
//!
//! Compiled for the crate's own tests and, through the `test-support`
//! feature, for the integration suites under `tests/`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeDelta, TimeZone, Utc};
use jsonwebtoken::Algorithm;
use mockable::Clock;

use crate::domain::ports::{
    ContactPersistenceError, ContactRepository, EmailMessage, Mailer, MailerError,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccountsService, Contact, ContactDraft, ContactId, ContactsService, EmailAddress,
    LoginCredentials, NewUser, Page, PlainPassword, Role, TokenService, TokenTtls, User, UserId,
    Username, hash_password,
};
use crate::inbound::http::rate_limit::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECS, RateLimiter};
use crate::inbound::http::state::HttpState;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Clock whose time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Clock fixed at midday UTC on the given date.
    pub fn at_date(date: NaiveDate) -> Self {
        let midday = date
            .and_hms_opt(12, 0, 0)
            .unwrap_or_else(|| panic!("midday exists on {date}"));
        Self::new(Utc.from_utc_datetime(&midday))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *lock(&self.0) += TimeDelta::seconds(seconds);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *lock(&self.0)
    }
}

/// Confirmed, logged-out account with an unusable password hash.
pub fn sample_user(email: &str) -> User {
    let email = EmailAddress::new(email).unwrap_or_else(|err| panic!("fixture email: {err}"));
    let local_part = email.as_ref().split('@').next().unwrap_or("user");
    let username = Username::new(format!("{local_part}-user"))
        .unwrap_or_else(|err| panic!("fixture username: {err}"));
    User {
        id: UserId::random(),
        username,
        email,
        password_hash: String::new(),
        avatar: None,
        refresh_token: None,
        role: Role::User,
        confirmed: true,
        created_at: Utc::now(),
    }
}

/// Like [`sample_user`] but with a real argon2 hash of `password`.
pub fn user_with_password(email: &str, password: &str) -> User {
    let plain = PlainPassword::new(password).unwrap_or_else(|err| panic!("fixture password: {err}"));
    let mut user = sample_user(email);
    user.password_hash = hash_password(&plain).unwrap_or_else(|err| panic!("hashing: {err}"));
    user
}

/// Valid contact draft with the given email and birthday.
pub fn sample_draft(email: &str, birth_date: NaiveDate) -> ContactDraft {
    ContactDraft::try_from_parts(
        "Grace",
        "Hopper",
        email,
        "+380501234567",
        birth_date,
        false,
    )
    .unwrap_or_else(|err| panic!("fixture draft: {err}"))
}

/// [`UserRepository`] held in a vector.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        Self {
            users: Mutex::new(users.into_iter().collect()),
        }
    }

    pub fn insert(&self, user: User) {
        lock(&self.users).push(user);
    }

    /// Current stored state for `email`.
    pub fn get(&self, email: &str) -> Option<User> {
        lock(&self.users)
            .iter()
            .find(|user| user.email.as_ref() == email)
            .cloned()
    }

    fn modify<R>(&self, id: &UserId, change: impl FnOnce(&mut User) -> R) -> Option<R> {
        lock(&self.users)
            .iter_mut()
            .find(|user| &user.id == id)
            .map(change)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.get(email.as_ref()))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.users).iter().find(|user| &user.id == id).cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut users = lock(&self.users);
        if users.iter().any(|existing| existing.email == user.email) {
            return Err(UserPersistenceError::conflict(user.email.as_ref()));
        }
        let created = User {
            id: UserId::random(),
            username: user.username.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            avatar: user.avatar.clone(),
            refresh_token: None,
            role: Role::User,
            confirmed: false,
            created_at: Utc::now(),
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn set_refresh_token(
        &self,
        id: &UserId,
        token: Option<String>,
    ) -> Result<(), UserPersistenceError> {
        self.modify(id, |user| user.refresh_token = token);
        Ok(())
    }

    async fn confirm_email(&self, email: &EmailAddress) -> Result<(), UserPersistenceError> {
        for user in lock(&self.users).iter_mut() {
            if &user.email == email {
                user.confirmed = true;
            }
        }
        Ok(())
    }

    async fn set_avatar(
        &self,
        id: &UserId,
        avatar: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.modify(id, |user| {
            user.avatar = Some(avatar.to_owned());
            user.clone()
        }))
    }

    async fn set_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<(), UserPersistenceError> {
        self.modify(id, |user| user.password_hash = password_hash.to_owned());
        Ok(())
    }
}

/// [`ContactRepository`] held in a vector.
#[derive(Default)]
pub struct InMemoryContactRepository {
    contacts: Mutex<Vec<Contact>>,
}

impl InMemoryContactRepository {
    /// Store a contact built from `draft` for `owner`, returning it.
    pub fn seed(&self, owner: &UserId, draft: ContactDraft) -> Contact {
        let contact = Contact::from_draft(ContactId::random(), *owner, draft);
        lock(&self.contacts).push(contact.clone());
        contact
    }

    pub fn len(&self) -> usize {
        lock(&self.contacts).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn select(&self, page: Page, keep: impl Fn(&Contact) -> bool) -> Vec<Contact> {
        let mut matching: Vec<Contact> = lock(&self.contacts)
            .iter()
            .filter(|contact| keep(contact))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            (a.last_name.as_ref(), a.first_name.as_ref(), a.id.as_uuid()).cmp(&(
                b.last_name.as_ref(),
                b.first_name.as_ref(),
                b.id.as_uuid(),
            ))
        });
        page.apply(matching)
    }
}

#[async_trait]
impl ContactRepository for InMemoryContactRepository {
    async fn list_for_owner(
        &self,
        owner: &UserId,
        page: Page,
    ) -> Result<Vec<Contact>, ContactPersistenceError> {
        Ok(self.select(page, |contact| &contact.owner_id == owner))
    }

    async fn list_all(&self, page: Page) -> Result<Vec<Contact>, ContactPersistenceError> {
        Ok(self.select(page, |_| true))
    }

    async fn find_by_first_name(
        &self,
        owner: &UserId,
        first_name: &str,
        page: Page,
    ) -> Result<Vec<Contact>, ContactPersistenceError> {
        Ok(self.select(page, |contact| {
            &contact.owner_id == owner && contact.first_name.as_ref() == first_name
        }))
    }

    async fn find_by_last_name(
        &self,
        owner: &UserId,
        last_name: &str,
        page: Page,
    ) -> Result<Vec<Contact>, ContactPersistenceError> {
        Ok(self.select(page, |contact| {
            &contact.owner_id == owner && contact.last_name.as_ref() == last_name
        }))
    }

    async fn find_by_email(
        &self,
        owner: &UserId,
        email: &EmailAddress,
    ) -> Result<Option<Contact>, ContactPersistenceError> {
        Ok(lock(&self.contacts)
            .iter()
            .find(|contact| &contact.owner_id == owner && &contact.email == email)
            .cloned())
    }

    async fn find_by_id(
        &self,
        owner: &UserId,
        id: &ContactId,
    ) -> Result<Option<Contact>, ContactPersistenceError> {
        Ok(lock(&self.contacts)
            .iter()
            .find(|contact| &contact.owner_id == owner && &contact.id == id)
            .cloned())
    }

    async fn email_taken(
        &self,
        owner: &UserId,
        email: &EmailAddress,
        excluding: Option<ContactId>,
    ) -> Result<bool, ContactPersistenceError> {
        Ok(lock(&self.contacts).iter().any(|contact| {
            &contact.owner_id == owner && &contact.email == email && Some(contact.id) != excluding
        }))
    }

    async fn create(&self, contact: &Contact) -> Result<(), ContactPersistenceError> {
        lock(&self.contacts).push(contact.clone());
        Ok(())
    }

    async fn update(&self, contact: &Contact) -> Result<(), ContactPersistenceError> {
        let mut contacts = lock(&self.contacts);
        if let Some(stored) = contacts
            .iter_mut()
            .find(|stored| stored.id == contact.id && stored.owner_id == contact.owner_id)
        {
            *stored = contact.clone();
        }
        Ok(())
    }

    async fn delete(
        &self,
        owner: &UserId,
        id: &ContactId,
    ) -> Result<Option<Contact>, ContactPersistenceError> {
        let mut contacts = lock(&self.contacts);
        let position = contacts
            .iter()
            .position(|contact| &contact.owner_id == owner && &contact.id == id);
        Ok(position.map(|index| contacts.remove(index)))
    }
}

/// Mailer that keeps every message it is asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<EmailMessage>>,
    failing: AtomicBool,
}

impl RecordingMailer {
    /// Mailer whose transport always fails, after recording the attempt.
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            failing: AtomicBool::new(true),
        }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        lock(&self.sent).clone()
    }

    /// Token carried by the most recent message.
    pub fn last_token(&self) -> Option<String> {
        lock(&self.sent).last().map(|message| message.token.clone())
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), MailerError> {
        lock(&self.sent).push(message);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MailerError::transport("connection refused"));
        }
        Ok(())
    }
}

/// Shared secret for tokens minted by [`InMemoryStack`].
pub const TEST_JWT_SECRET: &[u8] = b"contactbook-test-secret";

/// Real services wired over in-memory adapters, ready for HTTP tests.
pub struct InMemoryStack {
    pub users: Arc<InMemoryUserRepository>,
    pub contacts: Arc<InMemoryContactRepository>,
    pub mailer: Arc<RecordingMailer>,
    pub clock: Arc<MutableClock>,
    pub state: HttpState,
}

impl InMemoryStack {
    /// Stack whose clock sits at midday UTC on `today`.
    pub fn new(today: NaiveDate) -> Self {
        Self::with_limits(today, DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_SECS)
    }

    pub fn with_limits(today: NaiveDate, max_requests: u32, window_secs: u64) -> Self {
        let users = Arc::new(InMemoryUserRepository::default());
        let contacts = Arc::new(InMemoryContactRepository::default());
        let mailer = Arc::new(RecordingMailer::default());
        let clock = Arc::new(MutableClock::at_date(today));
        let tokens = TokenService::new(
            TEST_JWT_SECRET,
            Algorithm::HS256,
            TokenTtls::default(),
            clock.clone(),
        )
        .unwrap_or_else(|err| panic!("HS256 is supported: {err}"));
        let accounts = AccountsService::new(users.clone(), mailer.clone(), tokens);
        let contact_service = ContactsService::new(contacts.clone(), clock.clone());
        let limiter = Arc::new(RateLimiter::new(max_requests, window_secs, clock.clone()));
        let state = HttpState::new(Arc::new(accounts), Arc::new(contact_service), limiter);
        Self {
            users,
            contacts,
            mailer,
            clock,
            state,
        }
    }

    /// Token service sharing this stack's secret and clock.
    pub fn tokens(&self) -> TokenService {
        TokenService::new(
            TEST_JWT_SECRET,
            Algorithm::HS256,
            TokenTtls::default(),
            self.clock.clone(),
        )
        .unwrap_or_else(|err| panic!("HS256 is supported: {err}"))
    }

    /// Insert a confirmed account and open a session for it.
    ///
    /// Returns the stored user and a valid access token.
    pub async fn signed_in(&self, email: &str, password: &str, role: Role) -> (User, String) {
        let mut user = user_with_password(email, password);
        user.role = role;
        self.users.insert(user);
        let credentials = LoginCredentials::try_from_parts(email, password)
            .unwrap_or_else(|err| panic!("valid credentials: {err}"));
        let pair = self
            .state
            .accounts
            .login(&credentials)
            .await
            .unwrap_or_else(|err| panic!("login succeeds: {err}"));
        let user = self
            .users
            .get(email)
            .unwrap_or_else(|| panic!("user {email} stored"));
        (user, pair.access_token)
    }
}
