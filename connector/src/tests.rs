/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#[cfg(test)]
mod tests {
    use crate::analytics::*;
    use crate::companies::{IndustryServices, ServiceRef};
    use crate::discover::*;
    use crate::dto::*;
    use crate::session::Session;
    use crate::*;
    use chrono::{Duration, NaiveDate, Utc};
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    fn form(fields: &[(&str, &str)]) -> FormData {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn industry(name: &str, ids: &[i64]) -> IndustryServices {
        IndustryServices {
            industry: name.to_string(),
            services: ids
                .iter()
                .map(|id| ServiceRef {
                    id: *id,
                    name: format!("service-{}", id),
                })
                .collect(),
        }
    }

    fn token(claims: serde_json::Value) -> String {
        jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap()
    }

    #[test]
    fn test_company_missing_lists_default_to_not_specified() {
        let company = CompanyDto::from_response(json!({ "id": 7, "name": "Acme" })).unwrap();

        assert_eq!(company.id, 7);
        assert_eq!(company.technologies_used, vec![NOT_SPECIFIED.to_string()]);
        assert_eq!(company.specialties, vec![NOT_SPECIFIED.to_string()]);
        assert_eq!(company.partnerships, vec![NOT_SPECIFIED.to_string()]);
        assert_eq!(company.location, NOT_SPECIFIED);
        assert!(company.projects.is_empty());
    }

    #[test]
    fn test_company_empty_and_null_lists_default_to_not_specified() {
        let company = CompanyDto::from_response(json!({
            "id": "12",
            "technologiesUsed": [],
            "industries": null,
            "expertise": ["", "  "],
            "projects": null
        }))
        .unwrap();

        assert_eq!(company.id, 12);
        assert_eq!(company.technologies_used, not_specified());
        assert_eq!(company.industries, not_specified());
        assert_eq!(company.expertise, not_specified());
    }

    #[test]
    fn test_company_accepts_comma_separated_lists() {
        let company = CompanyDto::from_response(json!({
            "technologies": "Rust, Go ,,Kotlin",
            "isVerified": true
        }))
        .unwrap();

        assert_eq!(company.technologies_used, vec!["Rust", "Go", "Kotlin"]);
        assert!(company.verified);
    }

    #[test]
    fn test_default_dtos_never_have_empty_lists() {
        assert_eq!(CompanyDto::default().technologies_used, not_specified());
        assert_eq!(ProjectDto::default().technologies_used, not_specified());
        assert_eq!(CreateCompanyRequestDto::default().specialties, not_specified());
    }

    #[test]
    fn test_profile_from_form_data() {
        let profile = CompanyProfileDto::from_form_data(&form(&[
            ("name", "Acme"),
            ("specialties", "Consulting, Audits"),
            ("technologies", ""),
            ("founded_year", "1999"),
        ]))
        .unwrap();

        assert_eq!(profile.specialties, vec!["Consulting", "Audits"]);
        assert_eq!(profile.technologies_used, not_specified());
        assert_eq!(profile.founded_year, Some(1999));
        assert_eq!(profile.location, NOT_SPECIFIED);
    }

    #[test]
    fn test_profile_form_prefill_skips_placeholders() {
        let profile = CompanyProfileDto::from_company(&CompanyDto {
            name: "Acme".to_string(),
            ..Default::default()
        });

        let fields = profile.to_form_data();
        let lookup = |key: &str| {
            fields
                .iter()
                .find(|(k, _)| k == key)
                .and_then(|(_, v)| v.clone())
        };

        assert_eq!(lookup("name"), Some("Acme".to_string()));
        assert_eq!(lookup("technologies"), None);
        assert_eq!(lookup("location"), None);
    }

    #[test]
    fn test_create_company_validation_collects_field_errors() {
        let errors = CreateCompanyRequestDto::from_form_data(&form(&[
            ("name", "Acme"),
            ("contact_email", "not-an-email"),
            ("founded_year", "3020"),
        ]))
        .unwrap_err();

        assert!(errors.get("name").is_none());
        assert!(errors.get("description").is_some());
        assert!(errors.get("industry").is_some());
        assert!(errors.get("location").is_some());
        assert_eq!(errors.get("contact_email"), Some("Enter a valid email address"));
        assert!(errors.get("founded_year").is_some());
    }

    #[test]
    fn test_create_company_valid_form() {
        let request = CreateCompanyRequestDto::from_form_data(&form(&[
            ("name", "Acme"),
            ("description", "Widgets"),
            ("industry", "Manufacturing"),
            ("location", "Berlin"),
            ("contact_email", "hello@acme.example"),
            ("specialties", "Widgets, Gadgets"),
        ]))
        .unwrap();

        assert_eq!(request.specialties, vec!["Widgets", "Gadgets"]);
        assert_eq!(request.technologies_used, not_specified());
    }

    #[test]
    fn test_project_form_validation() {
        let errors = ProjectDto::from_form_data(&form(&[
            ("name", "Migration"),
            ("start_date", "2024-05-01"),
            ("completion_date", "2024-01-01"),
            ("client_company_id", "abc"),
        ]))
        .unwrap_err();

        assert!(errors.get("description").is_some());
        assert!(errors.get("completion_date").is_some());
        assert_eq!(errors.get("client_company_id"), Some("`abc` is not a valid id"));
    }

    #[test]
    fn test_project_from_response_fills_company_ids() {
        let project = ProjectDto::from_response(json!({
            "id": 3,
            "name": "Portal",
            "startDate": "2024-02-01T00:00:00",
            "clientCompany": { "id": 10, "name": "Client" },
            "providerCompany": { "id": 20, "name": "Provider" },
            "isCompletedByClient": true
        }))
        .unwrap();

        assert_eq!(project.client_company_id, Some(10));
        assert_eq!(project.provider_company_id, Some(20));
        assert_eq!(project.start_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert!(!project.is_reviewable());
    }

    #[test]
    fn test_project_completion_by_both_sides() {
        let mut project = ProjectDto {
            client_company_id: Some(1),
            provider_company_id: Some(2),
            ..Default::default()
        };

        assert!(project.mark_completed_by(1));
        assert!(!project.is_reviewable());
        assert!(!project.mark_completed_by(3));
        assert!(project.mark_completed_by(2));
        assert!(project.is_reviewable());
    }

    #[test]
    fn test_project_request_transitions() {
        let mut request: ProjectRequestDto = serde_json::from_value(json!({
            "requestId": 5,
            "name": "Portal",
            "status": "Pending"
        }))
        .unwrap();

        assert_eq!(request.request_id, Some(5));
        assert_eq!(request.project.name, "Portal");
        assert!(request.resolve(RequestStatus::Pending).is_err());
        assert!(request.resolve(RequestStatus::Approved).is_ok());
        assert_eq!(request.status, RequestStatus::Approved);

        let errors = request.resolve(RequestStatus::Declined).unwrap_err();
        assert_eq!(errors.get("status"), Some("Request is already approved"));
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(400, br#"{"message":"Name taken"}"#),
            "Name taken"
        );
        assert_eq!(
            extract_error_message(400, br#"{"title":"One or more validation errors occurred."}"#),
            "One or more validation errors occurred."
        );
        assert_eq!(extract_error_message(404, b"Company not found"), "Company not found");
        assert_eq!(
            extract_error_message(502, b"<html><body>Bad gateway</body></html>"),
            "Request failed with status 502"
        );
        assert_eq!(
            extract_error_message(500, br#"{"message":""}"#),
            "Request failed with status 500"
        );
    }

    #[test]
    fn test_request_config_trims_urls_and_empty_token() {
        let config = RequestConfig::new("https://api.example/")
            .with_search_url(Some("https://search.example/".to_string()))
            .with_token(Some(String::new()));

        assert_eq!(config.server_url, "https://api.example");
        assert_eq!(config.search_url.as_deref(), Some("https://search.example"));
        assert!(config.token.is_none());
    }

    #[test]
    fn test_session_from_token() {
        let exp = (Utc::now() + Duration::hours(1)).timestamp();
        let jwt = token(json!({
            "sub": "42",
            "name": "Ada Lovelace",
            "username": "ada",
            "email": "ada@example.com",
            "companies": "[{\"id\": 3, \"name\": \"Acme\"}]",
            "exp": exp
        }));

        let session = Session::from_token(&jwt).unwrap();

        assert_eq!(session.user().id, 42);
        assert_eq!(session.user().username, "ada");
        assert_eq!(session.user().companies.len(), 1);
        assert!(session.belongs_to(3));
        assert!(!session.is_expired());
        assert_eq!(session.expires_at().map(|t| t.timestamp()), Some(exp));
    }

    #[test]
    fn test_session_with_sub_and_id_claims() {
        let jwt = token(json!({
            "sub": "42",
            "id": 7,
            "unique_name": "ada",
            "email": "ada@example.com"
        }));

        let session = Session::from_token(&jwt).unwrap();

        assert_eq!(session.user().id, 7);
        assert_eq!(session.user().username, "ada");
        assert!(session.expires_at().is_none());
    }

    #[test]
    fn test_expired_session_is_not_restored() {
        let jwt = token(json!({
            "sub": 1,
            "email": "old@example.com",
            "exp": (Utc::now() - Duration::hours(1)).timestamp()
        }));

        assert!(Session::from_token(&jwt).unwrap().is_expired());
        assert!(Session::restore(Some(&jwt)).is_none());
        assert!(Session::restore(Some("garbage")).is_none());
        assert!(Session::restore(None).is_none());
    }

    #[test]
    fn test_services_hash_ignores_order() {
        let a = vec![industry("IT", &[2, 1]), industry("Finance", &[5])];
        let b = vec![industry("Finance", &[5]), industry("IT", &[1, 2])];

        assert_eq!(services_hash(&a), services_hash(&b));
        assert_eq!(services_hash(&a), "Finance:5|IT:1,2");
        assert_ne!(services_hash(&a), services_hash(&[industry("IT", &[1, 2])]));
    }

    #[test]
    fn test_fetch_status_staleness() {
        let now = Utc::now().timestamp_millis();
        let six_minutes = Duration::minutes(6).num_milliseconds();

        let mut status = FetchStatus::started("me", "hash", now - six_minutes);
        assert!(status.is_stale(fetch_status_timeout(), now));

        status.last_update = Some(now - 1000);
        assert!(!status.is_stale(fetch_status_timeout(), now));

        status.in_progress = false;
        status.last_update = None;
        assert!(!status.is_stale(fetch_status_timeout(), now));
    }

    #[test]
    fn test_fetch_status_wire_format() {
        let status: FetchStatus = serde_json::from_value(json!({
            "inProgress": true,
            "startTime": 1000,
            "servicesHash": "IT:1",
            "currentIndustryIndex": 2
        }))
        .unwrap();

        assert_eq!(status.current_industry_index, 2);
        assert_eq!(status.owner, None);
        assert_eq!(status.last_seen(), 1000);
    }

    #[test]
    fn test_ttl_cache_expiry_and_corruption() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let cache = TtlCache::new(std::sync::Arc::clone(&store), SERVICES_CACHE_KEY, cache_ttl());

        cache
            .put(ServicesBlob {
                data: vec![industry("IT", &[1])],
            })
            .unwrap();
        assert_eq!(cache.get::<ServicesBlob>().unwrap().data.len(), 1);

        let stale = json!({
            "data": [],
            "timestamp": (Utc::now() - Duration::hours(25)).timestamp_millis()
        });
        store.set(SERVICES_CACHE_KEY, &stale.to_string()).unwrap();
        assert!(cache.get::<ServicesBlob>().is_none());
        assert!(cache.entry::<ServicesBlob>().is_some());

        store.set(SERVICES_CACHE_KEY, "{not json").unwrap();
        assert!(cache.get::<ServicesBlob>().is_none());
        assert!(store.get(SERVICES_CACHE_KEY).is_none());
    }

    #[test]
    fn test_memory_store_quota() {
        let store = MemoryStore::with_quota(8);

        assert!(store.set("small", "1234").is_ok());
        assert!(matches!(
            store.set("large", "123456789"),
            Err(StoreError::QuotaExceeded { size: 9, limit: 8, .. })
        ));
        assert_eq!(store.keys(), vec!["small".to_string()]);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("compedia-store-{}", uuid::Uuid::new_v4()));
        let store = FileStore::new(dir.join("storage.json"));

        assert!(store.get("token").is_none());
        store.set("token", "abc").unwrap();
        store.set("other", "def").unwrap();
        assert_eq!(store.get("token").as_deref(), Some("abc"));

        store.remove("token");
        assert!(store.get("token").is_none());
        assert_eq!(
            FileStore::new(dir.join("storage.json")).get("other").as_deref(),
            Some("def")
        );

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_percentages_with_huge_counts() {
        let shares = percentages(&[Count::new("a", u64::MAX), Count::new("b", u64::MAX)]);

        assert_eq!(shares[0].percentage, 50);
        assert_eq!(shares[1].percentage, 50);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let shares = percentages(&[
            Count::new("IT", 1),
            Count::new("Finance", 1),
            Count::new("Health", 1),
        ]);

        assert_eq!(shares.iter().map(|s| s.percentage).sum::<u32>(), 100);
        assert_eq!(
            shares.iter().map(|s| s.percentage).collect::<Vec<_>>(),
            vec![34, 33, 33]
        );

        let zero = percentages(&[Count::new("IT", 0)]);
        assert_eq!(zero[0].percentage, 0);
        assert!(percentages(&[]).is_empty());
    }

    #[test]
    fn test_bubbles_scale_by_area() {
        let bubbles = bubbles(&[Count::new("a", 100), Count::new("b", 25), Count::new("c", 0)]);

        assert_eq!(bubbles[0].radius, 1.0);
        assert_eq!(bubbles[1].radius, 0.5);
        assert_eq!(bubbles[2].radius, 0.0);
    }

    #[test]
    fn test_conversion_rate() {
        let analytics = CompanyAnalytics {
            profile_views: 25,
            search_appearances: 200,
            ..Default::default()
        };

        assert_eq!(analytics.conversion_rate(), Some(12.5));
        assert_eq!(CompanyAnalytics::default().conversion_rate(), None);
    }

    #[test]
    fn test_review_validation() {
        let review = crate::reviews::ReviewRequest {
            project_id: 1,
            company_id: 2,
            rating: 6,
            comment: " ".to_string(),
        };

        let errors = review.validate().unwrap_err();
        assert!(errors.get("rating").is_some());
        assert!(errors.get("comment").is_some());
    }

    #[test]
    fn test_field_errors_display() {
        let mut errors = FieldErrors::new();
        errors.insert("name", "required");
        errors.insert("email", "invalid");
        errors.insert("name", "ignored duplicate");

        assert_eq!(errors.to_string(), "email: invalid; name: required");
        assert_eq!(ConnectorError::from(errors).to_string(), "email: invalid; name: required");
    }
}
