// Aviso ao administrador quando alguém se cadastra. É best-effort: quem chama
// registra a falha no log e segue em frente, o cadastro nunca falha por isso.

use async_trait::async_trait;

use crate::config::{AppConfig, MailConfig};

/// Mensagem do log: o aviso é registrado, a entrega fica com o relay
const NOTICE_RECORDED: &str = "Aviso de cadastro ao administrador registrado";

#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub user_id: i32,
    pub nome: String,
    pub login: String,
    pub email: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("ADMIN_EMAIL não configurado")]
    NoRecipient,

    #[error("Servidor de e-mail não configurado")]
    NoMailServer,
}

#[async_trait]
pub trait AdminNotifier: Send + Sync {
    async fn registration_pending(&self, registration: &PendingRegistration) -> Result<(), NotifyError>;
}

/// Monta o aviso e o entrega ao relay SMTP configurado. A entrega em si fica
/// fora deste serviço; aqui o aviso é registrado no log estruturado.
#[derive(Debug, Clone)]
pub struct MailNotifier {
    admin_email: Option<String>,
    mail: Option<MailConfig>,
}

impl MailNotifier {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            admin_email: config.admin_email.clone(),
            mail: config.mail.clone(),
        }
    }

    fn subject(registration: &PendingRegistration) -> String {
        format!("Novo cadastro aguardando aprovação: {}", registration.login)
    }
}

#[async_trait]
impl AdminNotifier for MailNotifier {
    async fn registration_pending(&self, registration: &PendingRegistration) -> Result<(), NotifyError> {
        let to = self.admin_email.as_deref().ok_or(NotifyError::NoRecipient)?;
        let mail = self.mail.as_ref().ok_or(NotifyError::NoMailServer)?;

        tracing::info!(
            to,
            from = %mail.from,
            smtp_host = %mail.host,
            smtp_port = mail.port,
            smtp_user = mail.user.as_deref().unwrap_or("-"),
            user_id = registration.user_id,
            nome = %registration.nome,
            email = registration.email.as_deref().unwrap_or("-"),
            subject = %Self::subject(registration),
            "{}",
            NOTICE_RECORDED
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration() -> PendingRegistration {
        PendingRegistration {
            user_id: 1,
            nome: "Ana".into(),
            login: "ana".into(),
            email: None,
        }
    }

    fn mail() -> MailConfig {
        MailConfig {
            host: "smtp.local".into(),
            port: 587,
            user: None,
            from: "noreply@local".into(),
        }
    }

    #[tokio::test]
    async fn test_missing_recipient_fails() {
        let notifier = MailNotifier { admin_email: None, mail: Some(mail()) };
        let result = notifier.registration_pending(&registration()).await;
        assert!(matches!(result, Err(NotifyError::NoRecipient)));
    }

    #[tokio::test]
    async fn test_missing_mail_server_fails() {
        let notifier = MailNotifier { admin_email: Some("admin@local".into()), mail: None };
        let result = notifier.registration_pending(&registration()).await;
        assert!(matches!(result, Err(NotifyError::NoMailServer)));
    }

    #[tokio::test]
    async fn test_configured_notifier_succeeds() {
        let notifier = MailNotifier { admin_email: Some("admin@local".into()), mail: Some(mail()) };
        assert!(notifier.registration_pending(&registration()).await.is_ok());
        assert_eq!(MailNotifier::subject(&registration()), "Novo cadastro aguardando aprovação: ana");
        assert!(NOTICE_RECORDED.contains("registrado"));
        assert!(!NOTICE_RECORDED.contains("enviado"));
    }
}
