use marketing_site::models::{
    ContactRequest, CreatePostRequest, CreateTestimonialRequest, EnquiryRequest,
    NewsletterRequest, UpdatePostRequest, Validate, is_plausible_email, is_valid_slug,
    normalize_email,
};

#[test]
fn email_plausibility() {
    for ok in ["a@b.io", "first.last+tag@sub.example.com", "  padded@x.org "] {
        assert!(is_plausible_email(ok), "{ok}");
    }
    for bad in ["", "plain", "@x.io", "a@", "a@b", "a@.io", "a@io.", "a@@b.io", "a b@c.io"] {
        assert!(!is_plausible_email(bad), "{bad}");
    }
    assert_eq!(normalize_email("  Mixed@Case.IO "), "mixed@case.io");
}

#[test]
fn slug_rules() {
    for ok in ["a", "hello-world", "2024-recap"] {
        assert!(is_valid_slug(ok), "{ok}");
    }
    for bad in ["", "-lead", "trail-", "double--dash", "Upper", "with space", "under_score"] {
        assert!(!is_valid_slug(bad), "{bad}");
    }
}

#[test]
fn contact_lists_all_missing_fields_in_order() {
    let err = ContactRequest::default().validate().unwrap_err();
    assert_eq!(err.missing, vec!["name", "email", "message"]);
    assert_eq!(err.to_string(), "missing or invalid fields: name, email, message");

    let ok = ContactRequest {
        name: "Kim".to_string(),
        email: "kim@example.com".to_string(),
        phone: None,
        message: "Hello".to_string(),
    };
    assert!(ok.validate().is_ok());
}

#[test]
fn whitespace_only_counts_as_missing() {
    let req = EnquiryRequest {
        name: "   ".to_string(),
        email: "e@x.io".to_string(),
        service: "\t".to_string(),
        message: "m".to_string(),
        ..EnquiryRequest::default()
    };
    assert_eq!(req.validate().unwrap_err().missing, vec!["name", "service"]);
}

#[test]
fn newsletter_needs_a_plausible_email() {
    assert!(NewsletterRequest { email: "x@y.io".to_string() }.validate().is_ok());
    assert_eq!(
        NewsletterRequest { email: "nope".to_string() }
            .validate()
            .unwrap_err()
            .missing,
        vec!["email"]
    );
}

#[test]
fn testimonial_rating_range() {
    let base = CreateTestimonialRequest {
        author: "A".to_string(),
        company: None,
        quote: "Q".to_string(),
        rating: 1,
    };
    assert!(base.validate().is_ok());
    assert!(CreateTestimonialRequest { rating: 5, ..base.clone() }.validate().is_ok());
    assert!(CreateTestimonialRequest { rating: 0, ..base.clone() }.validate().is_err());
    assert!(CreateTestimonialRequest { rating: 6, ..base }.validate().is_err());
}

#[test]
fn post_requests() {
    let err = CreatePostRequest::default().validate().unwrap_err();
    assert_eq!(err.missing, vec!["slug", "title", "body"]);

    assert!(UpdatePostRequest::default().validate().is_ok());
    let err = UpdatePostRequest {
        slug: Some("Bad Slug".to_string()),
        title: Some(" ".to_string()),
        ..UpdatePostRequest::default()
    }
    .validate()
    .unwrap_err();
    assert_eq!(err.missing, vec!["slug", "title"]);
}
