// src/webscan/fingerprint/detectors/backend.rs
use crate::webscan::fingerprint::{Signature, SignatureDetector};

/// Server-side web frameworks.
pub fn detectors() -> Vec<SignatureDetector> {
    vec![
        SignatureDetector::new("Laravel", vec![
            Signature::header("laravel_session", 0.4),
            Signature::header("XSRF-TOKEN", 0.3),
            Signature::body("<meta name=\"csrf-token\"", 0.3),
        ]),
        SignatureDetector::new("Django", vec![
            Signature::header("csrfmiddlewaretoken", 0.4),
            Signature::header("csrftoken", 0.3),
            Signature::body("django.contrib", 0.3),
            Signature::body("django.core", 0.3),
            Signature::body("__admin_media_prefix__", 0.3),
        ]),
        SignatureDetector::new("Ruby on Rails", vec![
            Signature::header("csrf-param", 0.4),
            Signature::header("csrf-token", 0.3),
            Signature::header("_rails_session", 0.3),
            Signature::body("ruby-on-rails", 0.3),
            Signature::body("rails-env", 0.3),
            Signature::body("data-turbo", 0.2),
        ]),
        SignatureDetector::new("Express.js", vec![
            Signature::header("Express", 0.5),
            Signature::header("connect.sid", 0.3),
        ]),
        SignatureDetector::new("ASP.NET", vec![
            Signature::header("X-AspNet-Version", 0.5),
            Signature::header("X-AspNetMvc-Version", 0.5),
            Signature::header("ASP.NET", 0.4),
            Signature::body("__VIEWSTATE", 0.4),
            Signature::body("__EVENTVALIDATION", 0.3),
            Signature::body("__VIEWSTATEGENERATOR", 0.3),
            Signature::body(".aspx", 0.2),
            Signature::body(".ashx", 0.2),
            Signature::body(".asmx", 0.2),
            Signature::header("asp.net_sessionid", 0.4),
            Signature::header("X-Powered-By: ASP.NET", 0.4),
        ]),
        SignatureDetector::new("ASP.NET Core", vec![
            Signature::header(".AspNetCore.", 0.5),
            Signature::body("blazor", 0.4),
            Signature::body("_blazor", 0.4),
            Signature::header("dotnet", 0.2),
        ]),
        SignatureDetector::new("Spring", vec![
            Signature::header("org.springframework", 0.4),
            Signature::header("spring-security", 0.3),
            Signature::header("JSESSIONID", 0.3),
            Signature::header("X-Application-Context", 0.3),
        ]),
        SignatureDetector::new("Spring Boot", vec![
            Signature::body("spring-boot", 0.5),
            Signature::body("actuator", 0.3),
            Signature::body("whitelabel", 0.2),
        ]),
        SignatureDetector::new("Flask", vec![
            Signature::header("Werkzeug", 0.4),
            Signature::header("flask", 0.3),
            Signature::body("jinja2", 0.3),
        ]),
        SignatureDetector::new("Symfony", vec![
            Signature::header("symfony", 0.4),
            Signature::header("sf_", 0.3),
            Signature::header("_sf2_", 0.3),
        ]),
        SignatureDetector::new("FastAPI", vec![
            Signature::header("fastapi", 0.4),
            Signature::header("starlette", 0.3),
        ]),
        SignatureDetector::new("Gin", vec![
            Signature::body("gin-gonic", 0.4),
            Signature::header("gin", 0.2),
        ]),
        SignatureDetector::new("Phoenix", vec![
            Signature::header("_csrf_token", 0.4),
            Signature::body("phx-", 0.3),
            Signature::body("phoenix", 0.2),
        ]),
        SignatureDetector::new("Strapi", vec![
            Signature::body("strapi", 0.4),
            Signature::body("/api/", 0.2),
        ]),
        SignatureDetector::new("AdonisJS", vec![
            Signature::body("adonis", 0.4),
            Signature::header("_csrf", 0.2),
        ]),
        SignatureDetector::new("CakePHP", vec![
            Signature::body("cakephp", 0.4),
            Signature::body("cake", 0.2),
        ]),
        SignatureDetector::new("CodeIgniter", vec![
            Signature::body("codeigniter", 0.4),
            Signature::header("ci_session", 0.4),
        ]),
    ]
}
