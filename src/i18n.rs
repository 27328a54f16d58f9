//! User-facing text in the two site languages.
//!
//! Every message shown to a visitor or admin goes through [`t`] or [`tf`],
//! including translated error text. Templates call the same table through the
//! `t` template function registered in [`crate::api::render`].

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Ru,
    En,
}

impl Locale {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "ru" => Some(Locale::Ru),
            "en" => Some(Locale::En),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }
}

/// (key, ru, en)
const MESSAGES: &[(&str, &str, &str)] = &[
    // Site chrome
    ("site.brand", "САБИНА МАК", "SABINA MAK"),
    ("nav.home", "Главная", "Home"),
    ("nav.collections", "Коллекции", "Collections"),
    ("nav.photosets", "Фотосеты", "Photosets"),
    ("nav.videos", "Видео", "Videos"),
    ("nav.about", "О бренде", "About"),
    ("nav.contact", "Контакты", "Contact"),
    ("hero.tagline", "Современная мода и редакционная фотография", "Contemporary fashion and editorial photography"),
    ("hero.intro", "Стиль - это образ жизни. Главное - не количество вещей, а их качество!", "Style is a way of life. What matters is not how many things you own, but their quality."),
    ("hero.explore", "Смотреть коллекции", "Explore collections"),
    ("collections.title", "Коллекции", "Collections"),
    ("collections.empty", "Коллекции пока не добавлены", "No collections yet"),
    ("collections.featured", "Избранное", "Featured"),
    ("photosets.title", "Фотосеты", "Photosets"),
    ("photosets.empty", "Фотосеты пока не добавлены", "No photosets yet"),
    ("photosets.by", "Фотограф", "Photographer"),
    ("videos.title", "Видео", "Videos"),
    ("videos.empty", "Видео пока не добавлены", "No videos yet"),
    ("category.all", "Все", "All"),
    ("category.editorial", "Редакционные", "Editorial"),
    ("category.campaign", "Кампании", "Campaigns"),
    ("category.lookbook", "Лукбуки", "Lookbooks"),
    ("about.title", "О бренде САБИНА МАК", "About SABINA MAK"),
    ("about.lead", "Команда бренда поможет вам произвести то самое впечатление.", "Our team will help you make exactly the impression you want."),
    ("about.body", "Для тех, кто ценит качество, стремится к гармонии и знает, что настоящая мода начинается с уверенности в себе.", "For those who value quality, seek harmony and know that real fashion starts with confidence."),
    ("contact.title", "Контакты", "Contact"),
    ("contact.body", "Свяжитесь с нами по вопросам сотрудничества и заказов.", "Get in touch about collaborations and orders."),
    ("footer.rights", "Все права защищены.", "All rights reserved."),
    ("common.retry", "Попробовать снова", "Try again"),
    ("common.error", "Ошибка:", "Error:"),
    ("common.loading", "Загрузка...", "Loading..."),
    // Route guard
    ("guard.checking", "Проверка доступа...", "Checking access..."),
    ("guard.denied.title", "Доступ запрещен", "Access denied"),
    ("guard.denied.body", "Для доступа к этой странице необходимо войти в систему.", "You need to sign in to view this page."),
    ("guard.denied.link", "Войти в систему", "Sign in"),
    ("guard.forbidden.body", "У вашей учетной записи нет прав администратора.", "Your account does not have admin access."),
    // Sign in
    ("login.title", "Вход в админ-панель", "Admin sign in"),
    ("login.subtitle", "Управление контентом", "Content management"),
    ("login.email", "Email адрес", "Email address"),
    ("login.password", "Пароль", "Password"),
    ("login.submit", "Войти в систему", "Sign in"),
    ("login.back", "← Вернуться на сайт", "← Back to the site"),
    ("auth.invalid_credentials", "Неверный email или пароль", "Invalid email or password"),
    ("auth.failed", "Ошибка входа: {0}", "Sign-in failed: {0}"),
    ("auth.network", "Произошла ошибка при входе в систему: {0}", "Could not reach the sign-in service: {0}"),
    // Admin
    ("admin.title", "Админ-панель", "Admin panel"),
    ("admin.sign_out", "Выйти", "Sign out"),
    ("admin.back", "← Назад к панели", "← Back to dashboard"),
    ("admin.manage", "Управление контентом", "Content management"),
    ("admin.view_site", "Посмотреть сайт", "View site"),
    ("admin.collections", "Управление коллекциями", "Manage collections"),
    ("admin.photosets", "Управление фотосетами", "Manage photosets"),
    ("admin.videos", "Управление видео", "Manage videos"),
    ("admin.settings", "Настройки сайта", "Site settings"),
    ("admin.signed_in_as", "Вы вошли как", "Signed in as"),
    ("form.add", "Добавить", "Add"),
    ("form.edit", "Редактировать", "Edit"),
    ("form.save", "Сохранить", "Save"),
    ("form.cancel", "Отмена", "Cancel"),
    ("form.delete", "Удалить", "Delete"),
    ("form.saved", "Изменения сохранены", "Changes saved"),
    ("form.deleted", "Запись удалена", "Entry deleted"),
    ("field.title", "Название", "Title"),
    ("field.description", "Описание", "Description"),
    ("field.season", "Сезон", "Season"),
    ("field.images", "Изображения", "Images"),
    ("field.image_upload", "Загрузите изображения (JPEG, PNG, WebP, максимум 10MB)", "Upload images (JPEG, PNG, WebP, up to 10MB)"),
    ("field.image_urls", "Или URL изображений, по одному на строку", "Or image URLs, one per line"),
    ("field.featured", "Избранная коллекция", "Featured collection"),
    ("field.location", "Локация", "Location"),
    ("field.photographer", "Фотограф", "Photographer"),
    ("field.category", "Категория", "Category"),
    ("field.caption", "Подпись", "Caption"),
    ("field.thumbnail", "Превью", "Thumbnail"),
    ("field.video", "Видео файл (MP4, WebM, OGG, максимум 50MB)", "Video file (MP4, WebM, OGG, up to 50MB)"),
    ("field.video_url", "Или URL видео", "Or video URL"),
    ("field.redirect_url", "Ссылка для перехода", "Redirect URL"),
    ("confirm.delete", "Вы уверены, что хотите удалить эту запись?", "Are you sure you want to delete this entry?"),
    ("confirm.yes", "Да, удалить", "Yes, delete"),
    ("fetch.collections", "Ошибка загрузки коллекций: {0}", "Failed to load collections: {0}"),
    ("fetch.photosets", "Ошибка загрузки фотосетов: {0}", "Failed to load photosets: {0}"),
    ("fetch.videos", "Ошибка загрузки видео: {0}", "Failed to load videos: {0}"),
    ("fetch.settings", "Ошибка загрузки настроек: {0}", "Failed to load settings: {0}"),
    ("save.failed", "Ошибка сохранения: {0}", "Failed to save: {0}"),
    ("delete.failed", "Ошибка удаления: {0}", "Failed to delete: {0}"),
    ("draft.title_required", "Укажите название", "Title is required"),
    ("draft.video_incomplete", "Загрузите видео и превью перед сохранением", "Upload both the video and its thumbnail before saving"),
    ("draft.background_required", "Укажите изображение", "Choose an image"),
    ("draft.invalid_form", "Некорректные данные формы: {0}", "Invalid form data: {0}"),
    // Storage gateway
    ("upload.missing_bucket", "Хранилище \"{0}\" не найдено. Создайте bucket \"{0}\" в панели Supabase Storage.", "Storage bucket \"{0}\" was not found. Create the \"{0}\" bucket in the Supabase Storage dashboard."),
    ("upload.timeout", "Превышено время ожидания. Проверьте подключение к интернету и повторите попытку.", "The upload timed out. Check your connection and try again."),
    ("upload.network", "Ошибка связи с сервером. Проверьте настройки Supabase и повторите попытку.", "Could not reach the storage server. Check the Supabase settings and try again."),
    ("upload.failed", "Ошибка загрузки: {0}", "Upload failed: {0}"),
    ("upload.instructions", "Инструкция:", "How to fix:"),
    ("upload.step1", "Откройте панель Supabase Dashboard", "Open the Supabase dashboard"),
    ("upload.step2", "Перейдите в раздел \"Storage\"", "Go to the \"Storage\" section"),
    ("upload.step3", "Создайте bucket с именем \"website-images\"", "Create a bucket named \"website-images\""),
    ("upload.step4", "Создайте bucket с именем \"website-videos\"", "Create a bucket named \"website-videos\""),
    ("upload.step5", "Настройте публичный доступ для обоих buckets", "Enable public access for both buckets"),
    ("validation.too_large", "Файл слишком большой. Максимальный размер: {0}", "File is too large. Maximum size: {0}"),
    ("validation.bad_type", "Неподдерживаемый тип файла. Разрешены: {0}", "Unsupported file type. Allowed: {0}"),
    // Settings
    ("settings.background", "Фоновое изображение", "Background image"),
    ("settings.background_url", "Или введите URL изображения", "Or enter an image URL"),
    ("settings.saved", "Фоновое изображение успешно обновлено", "Background image updated"),
    ("settings.current", "Текущие настройки", "Current settings"),
    ("settings.updated", "Обновлено", "Updated"),
    ("settings.preview", "Предварительный просмотр", "Preview"),
];

/// Look up a message. Unknown keys render as the key itself.
pub fn t(locale: Locale, key: &str) -> &str {
    MESSAGES
        .iter()
        .find(|(k, _, _)| *k == key)
        .map(|(_, ru, en)| match locale {
            Locale::Ru => *ru,
            Locale::En => *en,
        })
        .unwrap_or(key)
}

/// Look up a message and substitute `{0}`, `{1}`, ... with `args`.
pub fn tf(locale: Locale, key: &str, args: &[&str]) -> String {
    let mut text = t(locale, key).to_string();
    for (i, arg) in args.iter().enumerate() {
        text = text.replace(&format!("{{{i}}}"), arg);
    }
    text
}
