pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];
pub const KEYRING_SERVICE: &str = "genui-chat";
pub const KEYRING_USER: &str = "gemini";

pub const GREETING: &str = "Hello! How can I help you today? Try asking me to create a UI component, like \"show me a user profile card\".";

/// Appended to every prompt sent in generative-ui mode.
pub const HTML_INSTRUCTION_SUFFIX: &str = r#"
---
SYSTEM INSTRUCTION:
Your entire response MUST be a single, valid ```html block.
Do not provide any text or explanation outside of this block.
Inside the HTML, use Tailwind CSS classes for all styling. The app uses Tailwind, so you can use any of its classes (e.g., 'bg-blue-500', 'text-white', 'p-4', 'rounded-lg', 'flex', 'items-center').
For contextual images, use https://source.unsplash.com/500x300/?{query}, replacing {query} with relevant, comma-separated keywords (e.g., for a query about Miami weather, use 'miami,weather,sunny').
Your goal is to create a rich, visually appealing HTML component that directly answers the user's prompt.

Example for a weather query:
```html
<div class="bg-gray-700 p-4 rounded-lg shadow-md border border-gray-600 max-w-sm">
  <h3 class="text-xl font-bold text-white mb-2">Weather in Miami</h3>
  <img src="https://source.unsplash.com/500x300/?miami,weather,sunny" alt="Sunny day in Miami" class="rounded-md mb-3">
  <p class="text-gray-200">It's currently <strong class="text-cyan-400">sunny</strong> with a few clouds.</p>
  <div class="flex justify-between items-center mt-4">
    <span class="text-3xl font-semibold text-white">78°F</span>
    <span class="text-gray-300">Humidity: 65%</span>
  </div>
</div>
```

Example for a user profile query:
```html
<div class="bg-gray-700 p-4 rounded-lg shadow-md border border-gray-600 flex items-center gap-4 max-w-sm">
  <img src="https://picsum.photos/seed/janedoe/100/100" alt="Jane Doe" class="w-20 h-20 rounded-full border-2 border-cyan-400">
  <div>
    <h4 class="text-lg font-bold text-white">Jane Doe</h4>
    <p class="text-sm text-gray-300">Software Engineer</p>
    <button class="mt-2 px-3 py-1 bg-cyan-600 text-white text-xs rounded-full hover:bg-cyan-500">Contact</button>
  </div>
</div>
```
---
"#;

/// Alternative suffix used when UI-tree blocks are enabled.
pub const UI_TREE_INSTRUCTION_SUFFIX: &str = r#"
---
SYSTEM INSTRUCTION:
Answer with at most one short sentence of plain text followed by a single ```json block.
The JSON block describes a UI tree: {"type": string, "props": object, "children": [string | node]}.
Allowed types: div, p, h1, h2, h3, span, strong, em, ul, li, button, img, Card, UserProfile.
UserProfile takes props {"name", "title", "avatarUrl"}; Card takes an optional "className".
Use Tailwind CSS classes through the "className" prop. Never include scripts or event handlers.
---
"#;
