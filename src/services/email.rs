use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    Message, SmtpTransport, Transport,
};
use std::time::Duration;

use crate::config::SmtpConfig;
use crate::error::ApiError;

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send_activation_email(
        &self,
        to_email: &str,
        name: &str,
        activation_code: &str,
    ) -> Result<(), ApiError>;

    async fn send_order_confirmation(
        &self,
        to_email: &str,
        name: &str,
        course_name: &str,
        price: f64,
    ) -> Result<(), ApiError>;

    async fn send_question_reply_notice(
        &self,
        to_email: &str,
        course_name: &str,
        section_title: &str,
    ) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct EmailService {
    mailer: SmtpTransport,
    from_email: String,
}

impl EmailService {
    pub fn new(config: &SmtpConfig) -> Result<Self, ApiError> {
        let creds = Credentials::new(config.user.clone(), config.password.clone());

        let mailer = SmtpTransport::relay(&config.host)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!(e.to_string())))?
            .credentials(creds)
            .port(config.port)
            .timeout(Some(Duration::from_secs(10)))
            .build();

        tracing::info!(host = %config.host, "Email service initialized");

        Ok(Self {
            mailer,
            from_email: config.from_email.clone(),
        })
    }

    async fn send_email(
        &self,
        to_email: &str,
        subject: &str,
        plain_body: &str,
        html_body: &str,
    ) -> Result<(), ApiError> {
        let email = Message::builder()
            .from(self.from_email.parse().map_err(
                |e: lettre::address::AddressError| ApiError::Internal(e.into()),
            )?)
            .to(to_email.parse().map_err(
                |e: lettre::address::AddressError| ApiError::Internal(e.into()),
            )?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(plain_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .map_err(|e| ApiError::Internal(e.into()))?;

        // SMTP transport is blocking; keep it off the async runtime.
        let mailer = self.mailer.clone();
        let result = tokio::task::spawn_blocking(move || mailer.send(&email))
            .await
            .map_err(|e| ApiError::Internal(e.into()))?;

        match result {
            Ok(_) => {
                tracing::info!(to = %to_email, subject = %subject, "Email sent");
                Ok(())
            }
            Err(e) => {
                tracing::error!(error = %e, to = %to_email, "Failed to send email");
                Err(ApiError::Upstream(format!("Email delivery failed: {}", e)))
            }
        }
    }
}

#[async_trait]
impl EmailProvider for EmailService {
    async fn send_activation_email(
        &self,
        to_email: &str,
        name: &str,
        activation_code: &str,
    ) -> Result<(), ApiError> {
        let html_body = format!(
            r###"<html>
                <body style="font-family: Arial, sans-serif;">
                    <h2>Hello {}, activate your account</h2>
                    <p>Enter this code on the activation page to finish creating your account:</p>
                    <p style="font-size: 28px; letter-spacing: 6px; font-weight: bold;">{}</p>
                    <p style="color: #666; font-size: 12px;">
                        The code expires in 5 minutes. If you didn't sign up, please ignore this email.
                    </p>
                </body>
            </html>"###,
            name, activation_code
        );

        let plain_body = format!(
            "Hello {},\n\nEnter this code on the activation page to finish creating your account:\n\n{}\n\nThe code expires in 5 minutes. If you didn't sign up, please ignore this email.",
            name, activation_code
        );

        self.send_email(to_email, "Activate Your Account", &plain_body, &html_body)
            .await
    }

    async fn send_order_confirmation(
        &self,
        to_email: &str,
        name: &str,
        course_name: &str,
        price: f64,
    ) -> Result<(), ApiError> {
        let html_body = format!(
            r###"<html>
                <body style="font-family: Arial, sans-serif;">
                    <h2>Order confirmed</h2>
                    <p>Hi {}, thanks for your purchase.</p>
                    <table style="border-collapse: collapse;">
                        <tr><td style="padding: 4px 12px;">Course</td><td style="padding: 4px 12px;"><b>{}</b></td></tr>
                        <tr><td style="padding: 4px 12px;">Price</td><td style="padding: 4px 12px;">${:.2}</td></tr>
                    </table>
                    <p>The course is now available under your account.</p>
                </body>
            </html>"###,
            name, course_name, price
        );

        let plain_body = format!(
            "Hi {},\n\nThanks for your purchase.\n\nCourse: {}\nPrice: ${:.2}\n\nThe course is now available under your account.",
            name, course_name, price
        );

        self.send_email(to_email, "Order Confirmation", &plain_body, &html_body)
            .await
    }

    async fn send_question_reply_notice(
        &self,
        to_email: &str,
        course_name: &str,
        section_title: &str,
    ) -> Result<(), ApiError> {
        let html_body = format!(
            r###"<html>
                <body style="font-family: Arial, sans-serif;">
                    <h2>You have a new reply</h2>
                    <p>Your question in <b>{}</b> ({}) received a reply. Log in to read it.</p>
                </body>
            </html>"###,
            section_title, course_name
        );

        let plain_body = format!(
            "You have a new reply.\n\nYour question in \"{}\" ({}) received a reply. Log in to read it.",
            section_title, course_name
        );

        self.send_email(to_email, "Question Reply", &plain_body, &html_body)
            .await
    }
}

/// No-op provider for tests and local runs without SMTP credentials.
#[derive(Clone, Default)]
pub struct MockEmailService;

#[async_trait]
impl EmailProvider for MockEmailService {
    async fn send_activation_email(
        &self,
        _to_email: &str,
        _name: &str,
        _activation_code: &str,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    async fn send_order_confirmation(
        &self,
        _to_email: &str,
        _name: &str,
        _course_name: &str,
        _price: f64,
    ) -> Result<(), ApiError> {
        Ok(())
    }

    async fn send_question_reply_notice(
        &self,
        _to_email: &str,
        _course_name: &str,
        _section_title: &str,
    ) -> Result<(), ApiError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_service_creation() {
        let config = SmtpConfig {
            host: "smtp.gmail.com".to_string(),
            port: 587,
            user: "test@gmail.com".to_string(),
            password: "test_password".to_string(),
            from_email: "test@gmail.com".to_string(),
        };

        let service = EmailService::new(&config);
        assert!(service.is_ok());
    }
}
