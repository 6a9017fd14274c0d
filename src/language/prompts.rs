//! Built-in prompt templates.
//!
//! Every template carries the `{title}`, `{description}` and `{content}`
//! placeholders. Literal braces are written doubled (`{{`, `}}`).

/// Shared tail asking the model for a fenced JSON answer.
macro_rules! prompt_body {
    () => {
        "\nTranslate the following content:\n\
         Title: {title}\n\
         Description: {description}\n\
         Body: {content}\n\
         \n\
         Return the translation as a JSON code block in exactly this shape:\n\
         ```json\n\
         {{\n    \"title\": \"translated title\",\n    \"description\": \"translated description\",\n    \"content\": \"translated body\"\n}}\n\
         ```\n"
    };
}

pub const TRADITIONAL_TW: &str = concat!(
    "You are a professional translator. Translate the following Simplified Chinese news \
     into Traditional Chinese as used in Taiwan.\n\
     \n\
     Requirements:\n\
     1. Use Taiwanese vocabulary and phrasing\n\
     2. Keep the tone and style of the original\n\
     3. The translation must be accurate, natural and fluent\n\
     4. Render proper nouns the way Taiwanese media usually do\n\
     5. Keep the original formatting and structure\n\
     6. Prefer regional terms, e.g. 软件→軟體, 网络→網路, 信息→資訊\n",
    prompt_body!()
);

pub const TRADITIONAL_HK: &str = concat!(
    "You are a professional translator. Translate the following Simplified Chinese news \
     into Traditional Chinese as used in Hong Kong.\n\
     \n\
     Requirements:\n\
     1. Use Hong Kong vocabulary and phrasing\n\
     2. Keep the tone and style of the original\n\
     3. The translation must be accurate, natural and fluent\n\
     4. Render proper nouns the way Hong Kong media usually do\n\
     5. Keep the original formatting and structure\n\
     6. Prefer local expressions, e.g. 出租车→的士, 公交车→巴士, 手机→手提電話\n",
    prompt_body!()
);

pub const VIETNAMESE: &str = concat!(
    "You are a professional translator. Translate the following Simplified Chinese news \
     into Vietnamese.\n\
     \n\
     Requirements:\n\
     1. Use standard Vietnamese\n\
     2. Keep the tone and style of the original\n\
     3. The translation must be accurate, natural and fluent\n\
     4. Use the customary Vietnamese renderings of proper nouns\n\
     5. Keep the original formatting and structure\n\
     6. Use correct tone marks and appropriate polite forms\n",
    prompt_body!()
);

pub const JAPANESE: &str = concat!(
    "You are a professional translator. Translate the following Simplified Chinese news \
     into Japanese.\n\
     \n\
     Requirements:\n\
     1. Use standard Japanese with an honorific level suited to news\n\
     2. Keep the tone and style of the original\n\
     3. The translation must be accurate, natural and fluent\n\
     4. Use the customary Japanese renderings of proper nouns\n\
     5. Keep the original formatting and structure\n\
     6. Use hiragana, katakana and kanji correctly, with natural word order and particles\n",
    prompt_body!()
);

pub const ENGLISH: &str = concat!(
    "You are a professional translator. Translate the following Simplified Chinese news \
     into English.\n\
     \n\
     Requirements:\n\
     1. Use standard English\n\
     2. Keep the tone and style of the original\n\
     3. The translation must be accurate, natural and fluent\n\
     4. Use the customary English renderings of proper nouns\n\
     5. Keep the original formatting and structure\n\
     6. Choose a register appropriate for news writing\n",
    prompt_body!()
);

pub const HINDI: &str = concat!(
    "You are a professional translator. Translate the following Simplified Chinese news \
     into Hindi.\n\
     \n\
     Requirements:\n\
     1. Use standard Hindi in Devanagari script\n\
     2. Keep the tone and style of the original\n\
     3. The translation must be accurate, natural and fluent\n\
     4. Use the customary Hindi renderings of proper nouns\n\
     5. Keep the original formatting and structure\n",
    prompt_body!()
);
