// services/src/accounts.rs
use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use uuid::Uuid;

use models::errors::{MarketError, MarketResult, ValidationError};
use models::identifiers::MhNumber;
use models::patient::{NewPatient, Patient, Subscription};
use store::MarketStore;

// A colliding MH number is regenerated; past this many rejections something
// other than chance is wrong with the store.
const MAX_IDENTIFIER_ATTEMPTS: usize = 8;

/// Patient account management: registration, login, profile.
#[derive(Clone)]
pub struct PatientService {
    store: Arc<dyn MarketStore>,
}

impl PatientService {
    pub fn new(store: Arc<dyn MarketStore>) -> Self {
        PatientService { store }
    }

    pub async fn register(&self, new_patient: NewPatient) -> MarketResult<Patient> {
        validate_new_patient(&new_patient)?;

        if self
            .store
            .find_patient_by_email(&new_patient.email)
            .await?
            .is_some()
        {
            return Err(MarketError::EmailTaken(new_patient.email));
        }

        let password_hash = bcrypt::hash(&new_patient.password, bcrypt::DEFAULT_COST)
            .map_err(|e| MarketError::InternalError(format!("password hashing failed: {}", e)))?;

        let now = Utc::now();
        let mut patient = Patient {
            id: Uuid::new_v4(),
            email: new_patient.email,
            password_hash,
            first_name: new_patient.first_name,
            last_name: new_patient.last_name,
            date_of_birth: new_patient.date_of_birth,
            location: new_patient.location,
            mobile: new_patient.mobile,
            mh_number: MhNumber::generate(),
            subscription: Subscription::inactive(new_patient.subscription_type),
            created_at: now,
            updated_at: now,
        };

        // The store refuses an MH collision under its own lock; regenerate
        // and try again rather than pre-checking.
        for attempt in 0..MAX_IDENTIFIER_ATTEMPTS {
            match self.store.create_patient(patient.clone()).await {
                Ok(()) => {
                    info!("patient {} registered as {}", patient.id, patient.mh_number);
                    return Ok(patient);
                }
                Err(MarketError::AlreadyExists(taken)) => {
                    warn!(
                        "MH number {} already taken (attempt {}), regenerating",
                        taken, attempt
                    );
                    patient.mh_number = MhNumber::generate();
                }
                Err(other) => return Err(other),
            }
        }
        Err(MarketError::InternalError(
            "could not allocate a unique MH number".to_string(),
        ))
    }

    pub async fn login(&self, email: &str, password: &str) -> MarketResult<Patient> {
        let patient = self
            .store
            .find_patient_by_email(email)
            .await?
            .ok_or(MarketError::InvalidCredentials)?;
        let matched = bcrypt::verify(password, &patient.password_hash)
            .map_err(|e| MarketError::InternalError(format!("password check failed: {}", e)))?;
        if !matched {
            return Err(MarketError::InvalidCredentials);
        }
        Ok(patient)
    }

    pub async fn profile(&self, patient_id: Uuid) -> MarketResult<Patient> {
        self.store
            .get_patient(patient_id)
            .await?
            .ok_or_else(|| MarketError::NotFound(format!("patient {}", patient_id)))
    }
}

fn validate_new_patient(input: &NewPatient) -> MarketResult<()> {
    if input.email.trim().is_empty() {
        return Err(ValidationError::missing("email").into());
    }
    if !input.email.contains('@') {
        return Err(ValidationError::InvalidEmail(input.email.clone()).into());
    }
    if input.password.trim().is_empty() {
        return Err(ValidationError::missing("password").into());
    }
    if input.first_name.trim().is_empty() {
        return Err(ValidationError::missing("firstName").into());
    }
    if input.last_name.trim().is_empty() {
        return Err(ValidationError::missing("lastName").into());
    }
    if input.mobile.trim().is_empty() {
        return Err(ValidationError::missing("mobile").into());
    }
    Ok(())
}
