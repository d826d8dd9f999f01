use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use serde::{Deserialize, Serialize};

use entity::{job, job::Entity as JobEntity, job_application, job_application::Entity as ApplicationEntity};

use crate::error::{ServiceError, ServiceResult};
use crate::pagination::{page_offset, Page, PAGE_SIZE};
use crate::service::validate;
use crate::util::{now_ts, ts_to_display_date, ts_to_rfc3339, uuid_v4};

#[derive(Debug, Deserialize)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pay: String,
}

#[derive(Debug, Serialize)]
pub struct JobView {
    pub id: String,
    pub creator_username: String,
    pub title: String,
    pub description: String,
    pub pay: String,
    pub post_date: String,
    pub formatted_post_date: String,
}

impl From<job::Model> for JobView {
    fn from(j: job::Model) -> Self {
        Self {
            id: j.id,
            creator_username: j.creator,
            title: j.title,
            description: j.description,
            pay: j.pay,
            post_date: ts_to_rfc3339(j.created_at),
            formatted_post_date: ts_to_display_date(j.created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct NewApplication {
    pub applicant_name: String,
    pub applicant_email: String,
    #[serde(default)]
    pub applicant_phone: String,
    pub requested_pay: Option<String>,
    #[serde(default)]
    pub resume_text: String,
}

#[derive(Debug, Serialize)]
pub struct ApplicationView {
    pub id: String,
    pub job: String,
    pub job_title: String,
    pub job_creator: String,
    pub applicant: String,
    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: String,
    pub requested_pay: Option<String>,
    pub resume_text: String,
    pub application_date: String,
    pub formatted_application_date: String,
}

impl ApplicationView {
    fn build(app: job_application::Model, job: &job::Model) -> Self {
        Self {
            id: app.id,
            job: app.job_id,
            job_title: job.title.clone(),
            job_creator: job.creator.clone(),
            applicant: app.applicant,
            applicant_name: app.applicant_name,
            applicant_email: app.applicant_email,
            applicant_phone: app.applicant_phone,
            requested_pay: app.requested_pay,
            resume_text: app.resume_text,
            application_date: ts_to_rfc3339(app.created_at),
            formatted_application_date: ts_to_display_date(app.created_at),
        }
    }
}

async fn find_job(db: &DatabaseConnection, job_id: &str) -> ServiceResult<job::Model> {
    JobEntity::find_by_id(job_id.to_string())
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::not_found("Job not found"))
}

/// All postings, newest first, ten per page.
pub async fn list_jobs(db: &DatabaseConnection, page: u64) -> ServiceResult<Page<JobView>> {
    let count = JobEntity::find().count(db).await?;
    let offset = page_offset(page, count)?;

    let jobs = JobEntity::find()
        .order_by_desc(job::Column::CreatedAt)
        .order_by_desc(job::Column::Id)
        .offset(offset)
        .limit(PAGE_SIZE)
        .all(db)
        .await?;

    Ok(Page::new(page, count, jobs.into_iter().map(JobView::from).collect()))
}

pub async fn get_job(db: &DatabaseConnection, job_id: &str) -> ServiceResult<JobView> {
    Ok(find_job(db, job_id).await?.into())
}

pub async fn create_job(db: &DatabaseConnection, actor: &str, new: NewJob) -> ServiceResult<JobView> {
    let title = validate::required("title", &new.title, validate::JOB_TITLE_MAX)?;
    validate::at_most("pay", &new.pay, validate::PAY_MAX)?;

    let job = job::ActiveModel {
        id: Set(uuid_v4()),
        creator: Set(actor.to_string()),
        title: Set(title),
        description: Set(new.description),
        pay: Set(new.pay.trim().to_string()),
        created_at: Set(now_ts()),
    }
    .insert(db)
    .await?;

    tracing::debug!(job_id = %job.id, creator = actor, "job posted");
    Ok(job.into())
}

/// Delete a posting and, by cascade, its applications. Creator only.
pub async fn delete_job(db: &DatabaseConnection, actor: &str, job_id: &str) -> ServiceResult<()> {
    let job = find_job(db, job_id).await?;
    if job.creator != actor {
        return Err(ServiceError::forbidden("You can only delete your own job postings"));
    }
    job.delete(db).await?;
    Ok(())
}

pub async fn my_jobs(db: &DatabaseConnection, actor: &str) -> ServiceResult<Vec<JobView>> {
    let jobs = JobEntity::find()
        .filter(job::Column::Creator.eq(actor))
        .order_by_desc(job::Column::CreatedAt)
        .order_by_desc(job::Column::Id)
        .all(db)
        .await?;
    Ok(jobs.into_iter().map(JobView::from).collect())
}

pub async fn apply(db: &DatabaseConnection, actor: &str, job_id: &str, new: NewApplication) -> ServiceResult<ApplicationView> {
    let job = find_job(db, job_id).await?;

    let applicant_name = validate::required("applicant_name", &new.applicant_name, validate::NAME_MAX)?;
    let applicant_email = validate::email(&new.applicant_email)?;
    validate::at_most("applicant_phone", &new.applicant_phone, validate::PHONE_MAX)?;
    let requested_pay = validate::optional("requested_pay", new.requested_pay.as_deref(), validate::PAY_MAX)?;

    let app = job_application::ActiveModel {
        id: Set(uuid_v4()),
        job_id: Set(job.id.clone()),
        applicant: Set(actor.to_string()),
        applicant_name: Set(applicant_name),
        applicant_email: Set(applicant_email),
        applicant_phone: Set(new.applicant_phone.trim().to_string()),
        requested_pay: Set(requested_pay),
        resume_text: Set(new.resume_text),
        created_at: Set(now_ts()),
    }
    .insert(db)
    .await?;

    tracing::debug!(job_id, applicant = actor, "application received");
    Ok(ApplicationView::build(app, &job))
}

/// Applications for a posting, oldest first. Creator only.
pub async fn applications(db: &DatabaseConnection, actor: &str, job_id: &str) -> ServiceResult<Vec<ApplicationView>> {
    let job = find_job(db, job_id).await?;
    if job.creator != actor {
        return Err(ServiceError::forbidden("You can only view applications for your own job postings"));
    }

    let apps = ApplicationEntity::find()
        .filter(job_application::Column::JobId.eq(job_id))
        .order_by_asc(job_application::Column::CreatedAt)
        .order_by_asc(job_application::Column::Id)
        .all(db)
        .await?;
    Ok(apps.into_iter().map(|a| ApplicationView::build(a, &job)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seed_user, test_db};

    fn developer_job() -> NewJob {
        NewJob {
            title: "Software Developer".to_string(),
            description: "We need a Rust developer".to_string(),
            pay: "$100,000 - $120,000/year".to_string(),
        }
    }

    fn application() -> NewApplication {
        NewApplication {
            applicant_name: "Jane Smith".to_string(),
            applicant_email: "jane@example.com".to_string(),
            applicant_phone: "555-0100".to_string(),
            requested_pay: Some("$110,000".to_string()),
            resume_text: "Ten years of systems work.".to_string(),
        }
    }

    #[tokio::test]
    async fn post_and_fetch_job() {
        let db = test_db().await;
        seed_user(&db, "employer").await;

        let job = create_job(&db, "employer", developer_job()).await.unwrap();
        assert_eq!(job.creator_username, "employer");

        let fetched = get_job(&db, &job.id).await.unwrap();
        assert_eq!(fetched.pay, "$100,000 - $120,000/year");

        let page = list_jobs(&db, 1).await.unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].title, "Software Developer");

        assert_eq!(my_jobs(&db, "employer").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn job_fields_are_validated() {
        let db = test_db().await;
        seed_user(&db, "employer").await;

        let mut long_pay = developer_job();
        long_pay.pay = "$".repeat(101);
        assert!(matches!(
            create_job(&db, "employer", long_pay).await,
            Err(ServiceError::Validation(_))
        ));

        let mut no_title = developer_job();
        no_title.title = String::new();
        assert!(matches!(
            create_job(&db, "employer", no_title).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn only_creator_deletes() {
        let db = test_db().await;
        seed_user(&db, "employer").await;
        seed_user(&db, "seeker").await;
        let job = create_job(&db, "employer", developer_job()).await.unwrap();

        assert!(matches!(
            delete_job(&db, "seeker", &job.id).await,
            Err(ServiceError::Forbidden(_))
        ));
        assert!(get_job(&db, &job.id).await.is_ok());

        delete_job(&db, "employer", &job.id).await.unwrap();
        assert!(matches!(get_job(&db, &job.id).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn applications_are_visible_to_creator_only() {
        let db = test_db().await;
        seed_user(&db, "employer").await;
        seed_user(&db, "seeker").await;
        let job = create_job(&db, "employer", developer_job()).await.unwrap();

        let app = apply(&db, "seeker", &job.id, application()).await.unwrap();
        assert_eq!(app.applicant, "seeker");
        assert_eq!(app.job_title, "Software Developer");
        assert_eq!(app.job_creator, "employer");

        let listed = applications(&db, "employer", &job.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].applicant_name, "Jane Smith");

        assert!(matches!(
            applications(&db, "seeker", &job.id).await,
            Err(ServiceError::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn applying_to_missing_job_is_not_found() {
        let db = test_db().await;
        seed_user(&db, "seeker").await;
        assert!(matches!(
            apply(&db, "seeker", "missing", application()).await,
            Err(ServiceError::NotFound(_))
        ));

        let mut bad_email = application();
        bad_email.applicant_email = "jane".to_string();
        seed_user(&db, "employer").await;
        let job = create_job(&db, "employer", developer_job()).await.unwrap();
        assert!(matches!(
            apply(&db, "seeker", &job.id, bad_email).await,
            Err(ServiceError::Validation(_))
        ));
    }
}
