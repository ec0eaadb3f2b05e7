use crate::chart::ChartConfig;
use crate::errors::ChartError;
use crate::state::CANVAS_ID;
use crate::stats::EnergyExpenditure;

/// Renders the page. The canvas carries the series in `data-nutrition` and
/// the empty chart configuration in `data-chart`; the script draws the first
/// frame from those two attributes.
pub fn render_index(payload: &str, expenditure: Option<&EnergyExpenditure>) -> Result<String, ChartError> {
    let template = serde_json::to_string(&ChartConfig::nutrition(&[]))
        .map_err(|err| ChartError::MalformedPayload(err.to_string()))?;

    let summary = match expenditure {
        Some(tdee) => format!(
            "{} → {}: {:.0} kCal/day average, {:+.1} kg, estimated expenditure {:.0} kCal/day",
            tdee.start, tdee.end, tdee.average_calories, tdee.period_weight_difference,
            tdee.total_daily_energy_expenditure
        ),
        None => "Not enough data for an expenditure estimate yet.".to_string(),
    };

    Ok(INDEX_HTML
        .replace("{{CANVAS_ID}}", CANVAS_ID)
        .replace("{{CHART}}", &escape_attribute(&template))
        .replace("{{PAYLOAD}}", &escape_attribute(payload))
        .replace("{{SUMMARY}}", &escape_attribute(&summary)))
}

fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Nutrition</title>
  <style>
    body {
      margin: 0;
      font-family: system-ui, sans-serif;
      background: #f8fafc;
      color: #1e293b;
    }

    main {
      max-width: 960px;
      margin: 0 auto;
      padding: 32px 20px;
    }

    .card {
      background: #fff;
      border-radius: 12px;
      box-shadow: 0 12px 32px rgba(15, 23, 42, 0.08);
      padding: 20px;
      margin-bottom: 20px;
    }

    form {
      display: flex;
      flex-wrap: wrap;
      gap: 12px;
      align-items: end;
    }

    label {
      display: flex;
      flex-direction: column;
      font-size: 0.85rem;
      gap: 4px;
    }

    .status {
      min-height: 1.2em;
      font-size: 0.9rem;
    }
  </style>
</head>
<body>
  <main>
    <h1>Nutrition</h1>
    <section class="card">
      <canvas id="{{CANVAS_ID}}" data-chart="{{CHART}}" data-nutrition="{{PAYLOAD}}"></canvas>
      <p class="summary">{{SUMMARY}}</p>
    </section>

    <section class="card">
      <form id="update-form">
        <label>Date <input type="date" name="date" required /></label>
        <label>Calories (kCal) <input type="number" name="calories" step="1" /></label>
        <label>Weight (kg) <input type="number" name="weight" step="0.05" /></label>
        <button type="submit">Save</button>
      </form>
      <div class="status" id="status"></div>
    </section>
  </main>

  <script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
  <script src="https://cdn.jsdelivr.net/npm/chartjs-adapter-date-fns@3"></script>
  <script>
    const canvas = document.getElementById('{{CANVAS_ID}}');
    const statusEl = document.getElementById('status');

    const seedChart = () => {
      const config = JSON.parse(canvas.dataset.chart);
      const series = JSON.parse(canvas.dataset.nutrition);
      config.data.labels = series.map((day) => day.date);
      config.data.datasets[0].data = series.map((day) => day.calories ?? null);
      config.data.datasets[1].data = series.map((day) => day.weight ?? null);
      return new Chart(canvas, config);
    };

    const chart = seedChart();

    const refreshChart = async () => {
      const res = await fetch('/api/chart');
      if (!res.ok) {
        throw new Error('Unable to load chart');
      }
      const snapshot = await res.json();
      chart.data.labels = snapshot.config.data.labels;
      snapshot.config.data.datasets.forEach((dataset, i) => {
        chart.data.datasets[i].data = dataset.data;
      });
      chart.update();
    };

    const readField = (form, name) => {
      const raw = form.elements[name].value;
      return raw === '' ? undefined : Number(raw);
    };

    document.getElementById('update-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const form = event.target;
      const detail = { date: form.elements.date.value };
      const calories = readField(form, 'calories');
      const weight = readField(form, 'weight');
      if (calories !== undefined) detail.calories = calories;
      if (weight !== undefined) detail.weight = weight;

      const res = await fetch('/api/nutrition', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify(detail)
      });
      if (!res.ok) {
        statusEl.textContent = await res.text();
        return;
      }
      const body = await res.json();
      statusEl.textContent = body.status === 'applied' ? 'Saved' : 'Date is outside the chart';
      await refreshChart().catch((err) => { statusEl.textContent = err.message; });
    });
  </script>
</body>
</html>
"#;
