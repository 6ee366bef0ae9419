//! Клиентская проверка форм.
//!
//! Каждое поле проверяется независимо, для поля сохраняется сообщение первого
//! нарушенного правила. Непустой набор ошибок блокирует отправку формы целиком.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

const NAME_MIN_CHARS: usize = 3;
const PASSWORD_MIN_CHARS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Поле формы, к которому относится ошибка.
pub enum Field {
    /// Имя при регистрации.
    Name,
    /// Email.
    Email,
    /// Пароль.
    Password,
    /// Заголовок поста.
    Title,
    /// Текст поста.
    Content,
    /// Текст комментария.
    Comment,
}

impl Field {
    /// Имя поля в форме.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Password => "password",
            Self::Title => "title",
            Self::Content => "content",
            Self::Comment => "comment",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Ошибки формы: поле -> сообщение первого нарушенного правила.
pub struct ValidationErrors(BTreeMap<Field, &'static str>);

impl ValidationErrors {
    /// Форма корректна.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Количество полей с ошибками.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Сообщение для поля, если оно есть.
    pub fn get(&self, field: Field) -> Option<&'static str> {
        self.0.get(&field).copied()
    }

    /// Пары поле/сообщение в порядке полей.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &'static str)> + '_ {
        self.0.iter().map(|(field, message)| (*field, *message))
    }

    fn record(&mut self, field: Field, outcome: Result<(), &'static str>) {
        if let Err(message) = outcome {
            self.0.insert(field, message);
        }
    }

    fn into_result<T>(self, value: T) -> Result<T, Self> {
        if self.is_empty() { Ok(value) } else { Err(self) }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {message}", field.as_str())?;
            first = false;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Форма регистрации. Сериализуется как тело `POST /auth/register`.
pub struct RegistrationForm {
    /// Отображаемое имя.
    pub name: String,
    /// Email.
    pub email: String,
    /// Пароль.
    pub password: String,
}

impl RegistrationForm {
    /// Возвращает форму, если все поля корректны.
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        validate_registration(&self).into_result(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Форма входа. Сериализуется как тело `POST /auth/login`.
pub struct LoginForm {
    /// Email.
    pub email: String,
    /// Пароль.
    pub password: String,
}

impl LoginForm {
    /// Возвращает форму, если оба поля заполнены.
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.record(Field::Email, required(&self.email, "Email is required"));
        errors.record(
            Field::Password,
            required(&self.password, "Password is required"),
        );
        errors.into_result(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Заголовок и текст поста для создания или редактирования.
pub struct PostDraft {
    /// Заголовок.
    pub title: String,
    /// Текст.
    pub content: String,
}

impl PostDraft {
    /// Создаёт черновик из произвольных строк.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }

    /// Обрезает пробелы и проверяет, что оба поля не пустые.
    pub fn validate(self) -> Result<Self, ValidationErrors> {
        let title = self.title.trim().to_string();
        let content = self.content.trim().to_string();

        let mut errors = ValidationErrors::default();
        errors.record(Field::Title, required(&title, "Title is required"));
        errors.record(Field::Content, required(&content, "Content is required"));
        errors.into_result(Self { title, content })
    }
}

/// Проверяет форму регистрации.
///
/// - name: обязательно, минимум 3 символа, первая буква заглавная;
/// - email: обязательно, вид `local@domain.tld`;
/// - password: обязательно, минимум 5 символов, хотя бы одна заглавная латинская буква.
pub fn validate_registration(form: &RegistrationForm) -> ValidationErrors {
    let mut errors = ValidationErrors::default();
    errors.record(Field::Name, check_name(&form.name));
    errors.record(Field::Email, check_email(&form.email));
    errors.record(Field::Password, check_password(&form.password));
    errors
}

/// Комментарий из одних пробелов не отправляется.
pub fn validate_comment(text: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::default();
    errors.record(Field::Comment, required(text, "Comment must not be empty"));
    errors.into_result(())
}

fn required(value: &str, message: &'static str) -> Result<(), &'static str> {
    if value.trim().is_empty() {
        return Err(message);
    }
    Ok(())
}

fn check_name(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("Name is required");
    }
    if name.chars().count() < NAME_MIN_CHARS {
        return Err("Name must be at least 3 characters");
    }
    let starts_upper = name
        .chars()
        .next()
        .is_some_and(|first| first.to_uppercase().eq(std::iter::once(first)));
    if !starts_upper {
        return Err("First letter must be uppercase");
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), &'static str> {
    if email.is_empty() {
        return Err("Email is required");
    }
    if !has_address_shape(email) {
        return Err("Invalid email format");
    }
    Ok(())
}

fn check_password(password: &str) -> Result<(), &'static str> {
    if password.is_empty() {
        return Err("Password is required");
    }
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err("Password must be at least 5 characters");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain an uppercase letter");
    }
    Ok(())
}

// local@domain.tld: без пробелов, ровно один '@', в домене есть точка не с краю.
fn has_address_shape(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(idx, c)| c == '.' && idx > 0 && idx + 1 < domain.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(name: &str, email: &str, password: &str) -> RegistrationForm {
        RegistrationForm {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn lowercase_name_is_the_only_error() {
        let errors = validate_registration(&form("bob", "a@b.com", "Abcde"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::Name), Some("First letter must be uppercase"));
    }

    #[test]
    fn bad_email_is_the_only_error() {
        let errors = validate_registration(&form("Bob", "bad", "Abcde"));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get(Field::Email), Some("Invalid email format"));
    }

    #[test]
    fn password_without_uppercase_is_the_only_error() {
        let errors = validate_registration(&form("Bob", "a@b.com", "abcde"));
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(Field::Password),
            Some("Password must contain an uppercase letter")
        );
    }

    #[test]
    fn valid_registration_has_no_errors() {
        let errors = validate_registration(&form("Bob", "a@b.com", "Abcde"));
        assert!(errors.is_empty());
        assert!(form("Bob", "a@b.com", "Abcde").validate().is_ok());
    }

    #[test]
    fn fields_are_checked_independently_with_first_rule_only() {
        let errors = validate_registration(&form("", "", "ab"));
        assert_eq!(errors.get(Field::Name), Some("Name is required"));
        assert_eq!(errors.get(Field::Email), Some("Email is required"));
        assert_eq!(
            errors.get(Field::Password),
            Some("Password must be at least 5 characters")
        );

        let errors = validate_registration(&form("Al", "a@b.com", "Abcde"));
        assert_eq!(
            errors.get(Field::Name),
            Some("Name must be at least 3 characters")
        );
    }

    #[test]
    fn address_shape_rules() {
        assert!(has_address_shape("user@example.com"));
        assert!(!has_address_shape("user@example"));
        assert!(!has_address_shape("user@.com"));
        assert!(!has_address_shape("user@example."));
        assert!(!has_address_shape("@example.com"));
        assert!(!has_address_shape("us er@example.com"));
        assert!(!has_address_shape("a@b@c.com"));
    }

    #[test]
    fn loose_but_shaped_emails_are_accepted() {
        for email in [
            "ü@example.com",
            "a<b@example.com",
            "user@-example.com",
            "user@exa_mple.com",
            "a@b..com",
        ] {
            let errors = validate_registration(&form("Bob", email, "Abcde"));
            assert_eq!(errors.get(Field::Email), None, "{email} must be accepted");
        }
    }

    #[test]
    fn non_letter_first_char_passes_uppercase_rule() {
        assert!(check_name("1st user").is_ok());
        assert!(check_name("Émile").is_ok());
        assert!(check_name("élise").is_err());
    }

    #[test]
    fn post_draft_trims_and_requires_both_fields() {
        let draft = PostDraft::new("  Title ", " body ").validate().expect("must be valid");
        assert_eq!(draft.title, "Title");
        assert_eq!(draft.content, "body");

        let errors = PostDraft::new(" ", "").validate().expect_err("must be rejected");
        assert_eq!(errors.get(Field::Title), Some("Title is required"));
        assert_eq!(errors.get(Field::Content), Some("Content is required"));
    }

    #[test]
    fn blank_comment_is_rejected() {
        assert!(validate_comment("  \n\t").is_err());
        assert!(validate_comment("nice post").is_ok());
    }

    #[test]
    fn login_requires_both_fields() {
        let errors = LoginForm::default().validate().expect_err("must be rejected");
        assert_eq!(errors.len(), 2);
        assert!(errors.to_string().contains("email: Email is required"));
    }
}
