use crate::widget::Widget;

/// Wraps the widget's serialized element tree in the page shell. The theme
/// variables the badge controller set on the page root become CSS custom
/// properties on `:root`, which the stylesheet below consumes.
pub fn page_shell(widget: &Widget) -> String {
    let vars: Vec<String> = widget
        .page()
        .root_styles
        .iter()
        .map(|(name, value)| format!("{}: {};", name, value))
        .collect();

    PAGE_HTML
        .replace("{{ROOT_VARS}}", &vars.join("\n      "))
        .replace("{{WIDGET}}", &widget.html())
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="zh-CN">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Weekly Pulse</title>
  <style>
    :root {
      {{ROOT_VARS}}
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg-gradient, #1a1a2e);
      background-size: 400% 400%;
      animation: drift var(--animation-speed, 30s) ease infinite;
      color: #eaeaea;
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
    }

    @keyframes drift {
      0% { background-position: 0% 50%; }
      50% { background-position: 100% 50%; }
      100% { background-position: 0% 50%; }
    }

    .wakapulse-status {
      position: fixed;
      right: 18px;
      bottom: 18px;
      padding: 10px 16px;
      border-radius: 999px;
      background: rgba(10, 10, 20, 0.72);
      border: 1px solid var(--wakapulse-theme-color, #ffffff);
      box-shadow: 0 0 var(--glow-size, 10px) var(--glow-color, transparent);
      animation: pulse var(--pulse-speed, 4s) ease-in-out infinite;
      display: inline-flex;
      align-items: center;
      gap: 8px;
      font-size: 0.95rem;
    }

    @keyframes pulse {
      0%, 100% { transform: scale(1); }
      50% { transform: scale(1.04); }
    }

    .weekly-modal {
      position: fixed;
      inset: 0;
      display: grid;
      place-items: center;
      opacity: 0;
      pointer-events: none;
      transition: opacity 200ms ease;
    }

    .weekly-modal.show {
      opacity: 1;
      pointer-events: auto;
    }

    .modal-backdrop {
      position: absolute;
      inset: 0;
      background: rgba(0, 0, 0, 0.55);
    }

    .modal-content {
      position: relative;
      width: min(380px, 92vw);
      background: #101018;
      border: 1px solid var(--wakapulse-theme-color, #333);
      border-radius: 16px;
      padding: 20px;
      display: grid;
      gap: 14px;
      transform: translateY(8px);
      transition: transform 200ms ease;
    }

    .weekly-modal.show .modal-content {
      transform: translateY(0);
    }

    .modal-header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 12px;
    }

    .modal-header h2 {
      margin: 0;
      font-size: 0.9rem;
      letter-spacing: 0.22em;
      color: #8f8fa3;
    }

    .ai-badge {
      font-size: 0.8rem;
      padding: 4px 10px;
      border-radius: 999px;
      border: 1px solid var(--badge-color, #555);
      color: var(--badge-color, #aaa);
    }

    .weekly-chart-container svg {
      width: 100%;
      height: 120px;
      display: block;
    }

    .ai-insight p {
      margin: 0;
      font-size: 0.9rem;
      color: #c9c9d6;
    }

    .stats-grid {
      display: grid;
      grid-template-columns: repeat(3, 1fr);
      gap: 10px;
      text-align: center;
    }

    .stat-item .val {
      display: block;
      font-size: 1.2rem;
      font-weight: 600;
      color: var(--wakapulse-theme-color, #fff);
    }

    .stat-item .key {
      display: block;
      font-size: 0.7rem;
      letter-spacing: 0.18em;
      color: #77778a;
    }
  </style>
</head>
<body>
  {{WIDGET}}
</body>
</html>
"#;
